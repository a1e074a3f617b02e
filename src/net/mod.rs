/// Network layer: the blocking HTTP client, the token cookie jar and the
/// background request helper the views poll each frame.

pub mod client;
pub mod cookies;
pub mod task;
