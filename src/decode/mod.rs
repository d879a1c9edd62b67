/// GIF decoding into a time-addressable movie.
pub mod movie;
