//! Wire types shared by the hostlink daemon and its clients.
//!
//! The protocol is a stream of UTF-8 JSON objects with no length prefix and no
//! delimiter byte. Each message is self-delimited by brace balance, so a
//! receiver recovers discrete messages with [`FrameDecoder`] and a sender
//! simply writes serialised envelopes back-to-back.
//!
//! ```json
//! {"command":"ping","params":{}}
//! ```
//!
//! Responses carry a `status` discriminator:
//!
//! ```json
//! {"status":"ok","result":{"pong":true}}
//! {"status":"error","message":"unknown command: bogus"}
//! ```

mod envelope;
mod framing;

pub use envelope::{Request, Response};
pub use framing::{FrameDecoder, Frames, find_frame_end};
