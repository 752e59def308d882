// Состояние получателя

pub mod sequences;

pub use sequences::SequenceTable;
