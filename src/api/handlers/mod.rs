pub mod assist;
pub mod compose;
pub mod health;
pub mod proofread;
pub mod transcribe;
pub mod ui;
