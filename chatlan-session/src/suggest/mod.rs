mod name_suggestion;

pub use name_suggestion::*;
