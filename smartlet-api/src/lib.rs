#![cfg_attr(not(feature = "std"), no_std)]

pub mod wire;

pub use wire::{Body, DecodeError, Header, Message, MessageType, encode_reading};
