//! IHDR (image header) parser

use crate::{
    error::{Error, Result},
    metadata::{ColorType, ImageInfo},
    primitives::read_be_u32,
};
use log::debug;

/// Minimum IHDR payload length
pub const IHDR_SIZE: usize = 13;

/// Parse an IHDR payload
///
/// Only the length is enforced. Field values, including unknown color
/// types, are reported as found.
pub fn parse_ihdr(data: &[u8]) -> Result<ImageInfo> {
    if data.len() < IHDR_SIZE {
        return Err(Error::MalformedIhdr {
            length: data.len() as u32,
        });
    }

    let info = ImageInfo {
        width: read_be_u32(data, 0),
        height: read_be_u32(data, 4),
        bit_depth: data[8],
        color_type: ColorType::from_code(data[9]),
        compression_method: data[10],
        filter_method: data[11],
        interlace_method: data[12],
    };

    debug!(
        "IHDR: {}x{}, depth {}, color {}, interlace {}",
        info.width, info.height, info.bit_depth, info.color_type, info.interlace_method
    );

    Ok(info)
}
