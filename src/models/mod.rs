pub mod channel;
pub mod emote;
