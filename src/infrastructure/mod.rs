pub mod source_maps;
pub mod storage;
