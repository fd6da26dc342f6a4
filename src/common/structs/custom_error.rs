/// Plain-message error for the configuration and geo bootstrap paths.
/// Request handling reports through `TrackerError` instead.
#[derive(Debug)]
pub struct CustomError {
    pub message: String,
}
