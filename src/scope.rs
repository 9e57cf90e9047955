//! Per-thread codec context for nested `any` slots.
//!
//! Serde gives a `Serialize`/`Deserialize` impl no way to receive extra arguments, yet a
//! [`Dynamic`](crate::Dynamic) field buried inside a derived struct needs the active encode
//! options or registry. The encoder and decoder push themselves here for the duration of a
//! payload walk; the guard pops the frame on drop, including on early return.
//!
//! Errors raised inside such a slot cross the serde boundary as plain messages. They are also
//! stashed here so the codec can hand the original variant back to the caller.

use crate::{Decoder, Encoder, Error};
use std::cell::RefCell;

thread_local! {
    static ENCODERS: RefCell<Vec<Encoder>> = const { RefCell::new(Vec::new()) };
    static DECODERS: RefCell<Vec<(Decoder, usize)>> = const { RefCell::new(Vec::new()) };
    static STASHED: RefCell<Option<Error>> = const { RefCell::new(None) };
}

pub(crate) struct EncoderGuard {
    _private: (),
}

impl Drop for EncoderGuard {
    fn drop(&mut self) {
        ENCODERS.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

pub(crate) struct DecoderGuard {
    _private: (),
}

impl Drop for DecoderGuard {
    fn drop(&mut self) {
        DECODERS.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

pub(crate) fn enter_encoder(encoder: &Encoder) -> EncoderGuard {
    ENCODERS.with(|stack| stack.borrow_mut().push(encoder.clone()));
    EncoderGuard { _private: () }
}

/// The innermost active encoder, or a default one outside any encode call.
pub(crate) fn current_encoder() -> Encoder {
    ENCODERS
        .with(|stack| stack.borrow().last().cloned())
        .unwrap_or_default()
}

/// `depth` is the nesting level nested slots continue from.
pub(crate) fn enter_decoder(decoder: &Decoder, depth: usize) -> DecoderGuard {
    DECODERS.with(|stack| stack.borrow_mut().push((decoder.clone(), depth)));
    DecoderGuard { _private: () }
}

pub(crate) fn current_decoder() -> Option<(Decoder, usize)> {
    DECODERS.with(|stack| stack.borrow().last().cloned())
}

pub(crate) fn stash(error: Error) {
    STASHED.with(|slot| *slot.borrow_mut() = Some(error));
}

pub(crate) fn take_stashed() -> Option<Error> {
    STASHED.with(|slot| slot.borrow_mut().take())
}
