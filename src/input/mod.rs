pub mod discover;
pub mod hypervolume;
pub mod metadata;
pub mod solutions;
