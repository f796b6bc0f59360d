#![no_std]
#![cfg_attr(docs_rs, feature(doc_cfg))]
#![forbid(unsafe_code)]

//! A crate for playing Animated PNG (APNG) files frame by frame.
//!
//! Every APNG frame is only a partial update: a sub-rectangle of the canvas,
//! plus instructions for how to blend it with what's already there and what
//! to do with it once the next frame comes. This crate decodes each frame and
//! applies those rules, so that after every step you have the complete image
//! to display.
//!
//! * [`ApngStream`] is the main type: open, [`advance`](ApngStream::advance)
//!   once per frame, [`restart`](ApngStream::restart) at the end, close.
//! * [`AnimationPlayer`] paces a stream by elapsed time, for callers that have
//!   a periodic callback and a clock.
//! * [`compose_frame`] and [`CanvasBuffers`] are the compositing core, which
//!   can be driven by any [`PixelRowSource`], not just PNG data.
//!
//! All canvas pixels are 4 bytes with alpha last, either RGBA (the default)
//! or BGRA, see [`DecodeOptions`].
//!
//! ## Features
//! * `std` (default): opening by path, and `std::error::Error` impls. Without
//!   it the crate is `no_std` and only needs `alloc`.

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

#[cfg(target_pointer_width = "16")]
compile_error!("this crate assumes 32-bit or bigger pointers!");

mod error;
pub use error::*;

mod options;
pub use options::*;

mod frame;
pub use frame::*;

mod canvas;
pub use canvas::*;

mod compositor;
pub use compositor::*;

pub mod png;

mod source;
pub use source::*;

mod stream;
pub use stream::*;

mod player;
pub use player::*;
