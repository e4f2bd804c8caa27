use crate::{
    config::RenderStyle,
    foundation::{
        error::{PlotError, PlotResult},
        format::scientific,
    },
    input::{
        metadata::RunMetadata,
        solutions::{ColorMode, SolutionSet},
    },
    render::{
        frame::Frame,
        geometry::PlotGeometry,
        palette::{Palette, Rgb8},
        text::{TextBrushRgba8, TextRenderer},
    },
};

const STROKE_TOLERANCE: f64 = 0.1;
const TICK_LINE_WIDTH: f64 = 2.0;

/// Per-generation inputs that are not part of the solution set itself.
#[derive(Clone, Debug)]
pub struct FrameLabels<'a> {
    pub meta: &'a RunMetadata,
    pub mode: ColorMode,
    /// Generation number as written in the filename.
    pub generation: &'a str,
    /// Hypervolume to print, when hypervolume display is on for the run.
    pub hypervolume: Option<f64>,
}

/// Rasterizes parallel-coordinate frames on the CPU with `vello_cpu`.
#[derive(Debug)]
pub struct FrameRenderer {
    style: RenderStyle,
    text: Option<TextRenderer>,
    width: u16,
    height: u16,
}

impl FrameRenderer {
    /// Frames are drawn without header, footer and scale labels when `text` is `None`.
    pub fn new(style: RenderStyle, text: Option<TextRenderer>) -> PlotResult<Self> {
        style.validate()?;
        let width: u16 = style
            .width
            .try_into()
            .map_err(|_| PlotError::validation("canvas width exceeds u16"))?;
        let height: u16 = style
            .height
            .try_into()
            .map_err(|_| PlotError::validation("canvas height exceeds u16"))?;
        Ok(Self {
            style,
            text,
            width,
            height,
        })
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    pub fn has_text(&self) -> bool {
        self.text.is_some()
    }

    pub fn render(
        &mut self,
        set: &SolutionSet,
        palette: &Palette,
        labels: &FrameLabels<'_>,
    ) -> PlotResult<Frame> {
        let style = &self.style;
        let geometry = PlotGeometry::new(style, labels.meta);
        let (w, h) = (f64::from(style.width), f64::from(style.height));

        let mut ctx = vello_cpu::RenderContext::new(self.width, self.height);
        ctx.set_paint(color(style.background));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));

        if let Some(text) = self.text.as_mut() {
            let size = style.text_size_px();
            let top = header_text(
                labels.generation,
                labels.mode,
                set.max_rank(),
                labels.hypervolume,
            );
            let bottom = footer_text(labels.meta);
            let px = f64::from(size);
            let fg = style.text_color;
            draw_text(&mut ctx, text, &top, size, fg, (0.25 * px, 0.10 * px))?;
            draw_text(&mut ctx, text, &bottom, size, fg, (0.25 * px, h - 1.20 * px))?;
        }

        // Reverse order so that better solutions end up on top.
        for (idx, solution) in set.solutions().iter().enumerate().rev() {
            let points = geometry.solution_points(&solution.values);
            let Some(&first) = points.first() else {
                continue;
            };
            let mut path = kurbo::BezPath::new();
            if style.show_nest_lines {
                path.move_to(geometry.nest_anchor());
                path.line_to(first);
            } else {
                path.move_to(first);
            }
            for &p in &points[1..] {
                path.line_to(p);
            }
            stroke(
                &mut ctx,
                &path,
                style.solution_line_width,
                palette.color_for(idx, solution.rank),
            );
        }

        if style.show_bars {
            let mut bars = kurbo::BezPath::new();
            for &x in geometry.bars() {
                bars.move_to((x, geometry.band_top()));
                bars.line_to((x, geometry.band_bottom()));
            }
            stroke(&mut ctx, &bars, style.bar_width, style.bar_color);
        }

        if style.show_scale {
            let x = geometry.last_bar();
            let tick_length = geometry.tick_length();
            let ticks = geometry.scale_ticks(style.scale_ticks);

            let mut marks = kurbo::BezPath::new();
            for tick in &ticks {
                marks.move_to((x, tick.y));
                marks.line_to((x + tick_length, tick.y));
            }
            stroke(&mut ctx, &marks, TICK_LINE_WIDTH, style.bar_color);

            if let Some(text) = self.text.as_mut() {
                let size = style.scale_text_size_px();
                for tick in &ticks {
                    let origin = (x + 1.5 * tick_length, tick.y - 0.56 * f64::from(size));
                    draw_text(&mut ctx, text, &tick.label, size, style.text_color, origin)?;
                }
            }
        }

        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        Frame::from_premul(
            style.width,
            style.height,
            pixmap.data_as_u8_slice(),
            style.background,
        )
    }
}

/// `Gen: <g>`, then the highest rank when coloured by rank, then the hypervolume.
pub fn header_text(
    generation: &str,
    mode: ColorMode,
    max_rank: Option<u32>,
    hypervolume: Option<f64>,
) -> String {
    let mut out = format!("Gen: {generation}");
    let mut rank_width = 0;
    if let (ColorMode::ByRank, Some(max_rank)) = (mode, max_rank) {
        let rank = max_rank.to_string();
        rank_width = rank.len();
        out.push_str(&format!("    Ranks: {rank:>3}"));
    }
    if let Some(hv) = hypervolume {
        let pad = if rank_width == 0 {
            4
        } else {
            8usize.saturating_sub(rank_width)
        };
        out.push_str(&" ".repeat(pad));
        out.push_str(&format!("HV: {}", scientific(hv, 6)));
    }
    out
}

/// `<Function>    k:<k>    n:<n>    <Scalarizer>[    <Lang>]`.
pub fn footer_text(meta: &RunMetadata) -> String {
    let mut out = format!(
        "{}    k:{}    n:{}    {}",
        meta.objective_name, meta.k, meta.n, meta.scalarizer_name
    );
    if let Some(lang) = &meta.language_label {
        out.push_str(&format!("    {lang}"));
    }
    out
}

fn color(rgb: Rgb8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(rgb[0], rgb[1], rgb[2], 255)
}

fn stroke(ctx: &mut vello_cpu::RenderContext, path: &kurbo::BezPath, width: f64, rgb: Rgb8) {
    let style = kurbo::Stroke::new(width).with_join(kurbo::Join::Round);
    let outline = kurbo::stroke(
        path.iter(),
        &style,
        &kurbo::StrokeOpts::default(),
        STROKE_TOLERANCE,
    );
    ctx.set_paint(color(rgb));
    ctx.fill_path(&bezpath_to_cpu(&outline));
}

fn draw_text(
    ctx: &mut vello_cpu::RenderContext,
    text: &mut TextRenderer,
    s: &str,
    size_px: f32,
    rgb: Rgb8,
    origin: (f64, f64),
) -> PlotResult<()> {
    let layout = text.layout_line(s, size_px, TextBrushRgba8::opaque(rgb))?;
    ctx.set_transform(vello_cpu::kurbo::Affine::translate(origin));
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let brush = run.style().brush;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                brush.r, brush.g, brush.b, brush.a,
            ));
            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(text.font())
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    Ok(())
}

fn point_to_cpu(p: kurbo::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}
