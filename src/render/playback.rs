use crate::foundation::error::{XflError, XflResult};
use crate::project::model::{Keyframe, Layer, LoopMode};

/// Keyframe showing at `frame`, with the frame's offset into it.
///
/// Keyframes are sorted by start index, so this is a binary search for the last keyframe
/// starting at or before `frame`. Frames past the end of that keyframe show nothing.
pub fn active_keyframe(layer: &Layer, frame: u32) -> Option<(&Keyframe, u32)> {
    let idx = layer.keyframes.partition_point(|k| k.index <= frame);
    let keyframe = layer.keyframes.get(idx.checked_sub(1)?)?;
    let offset = frame - keyframe.index;
    (offset < keyframe.duration).then_some((keyframe, offset))
}

/// Symbol frame shown `offset` frames into a symbol instance's keyframe.
///
/// `last` is the instance's last frame, or the symbol timeline's last frame when the
/// instance does not set one.
pub fn loop_frame(mode: &LoopMode, first: u32, last: u32, offset: u32) -> XflResult<u32> {
    match mode {
        LoopMode::SingleFrame => Ok(first),
        LoopMode::Loop => {
            let len = i64::from(last) - i64::from(first) + 1;
            if len <= 0 {
                return Err(XflError::InvalidLoop {
                    first: i64::from(first),
                    last: i64::from(last),
                });
            }
            let frame = i64::from(first) + i64::from(offset) % len;
            u32::try_from(frame).map_err(|_| XflError::InvalidLoop {
                first: i64::from(first),
                last: i64::from(last),
            })
        }
        LoopMode::PlayOnce => Ok(first.saturating_add(offset).min(last)),
        LoopMode::Other(mode) => Err(XflError::UnknownLoopMode(mode.clone())),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/playback.rs"]
mod tests;
