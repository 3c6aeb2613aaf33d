pub mod compose;
pub mod proofread;
pub mod transcribe;

/// Shape check run by the `ValidJson` extractor after deserialization.
pub trait Validate {
    /// 400 message for a body that is missing, not JSON, or has the wrong shape.
    const INVALID_MESSAGE: &'static str;

    fn validate(&self) -> Result<(), &'static str>;
}
