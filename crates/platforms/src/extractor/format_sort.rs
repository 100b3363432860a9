use std::cmp::Ordering;

use crate::media::StreamInfo;

/// Orders formats from worst to best and records the rank in `priority`.
///
/// Resolution wins over bitrate, bitrate over frame rate. Formats that compare
/// equal keep the order the playlist gave them.
pub fn sort_formats(formats: &mut [StreamInfo]) {
    formats.sort_by(compare_quality);
    for (rank, format) in formats.iter_mut().enumerate() {
        format.priority = rank as u32;
    }
}

fn compare_quality(a: &StreamInfo, b: &StreamInfo) -> Ordering {
    a.height
        .unwrap_or(0)
        .cmp(&b.height.unwrap_or(0))
        .then_with(|| a.width.unwrap_or(0).cmp(&b.width.unwrap_or(0)))
        .then_with(|| a.bitrate.cmp(&b.bitrate))
        .then_with(|| a.fps.total_cmp(&b.fps))
}
