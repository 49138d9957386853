// ABOUTME: Archive packaging for the banana-slides development server
// ABOUTME: Bundles slide images and captions into a downloadable zip file

use crate::errors::Result;
use crate::slide::Slide;
use crate::slide_image::decode_data_uri;
use log::{info, warn};
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Name of the entry holding every caption
pub const TEXT_ENTRY_NAME: &str = "slideshow_text.txt";

/// Package slides into a zip archive held in memory.
///
/// Each slide contributes one entry: its PNG image when the slide carries
/// a base64 PNG data URI, otherwise a text note describing the image
/// reference. All captions are collected into `slideshow_text.txt`.
pub fn package(slides: &[Slide]) -> Result<Vec<u8>> {
    info!("Preparing ZIP file for {} slides", slides.len());

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut all_sentences = Vec::with_capacity(slides.len());

    for (i, slide) in slides.iter().enumerate() {
        let slide_num = i + 1;
        all_sentences.push(format!("Slide {}:\n{}\n", slide_num, slide.sentence()));

        let image_url = slide.image_url();
        let prompt = slide.image_prompt().unwrap_or("N/A");

        if image_url.starts_with(PNG_DATA_URI_PREFIX) {
            match decode_data_uri(image_url) {
                Ok(image_bytes) => {
                    zip.start_file(format!("slide_{}.png", slide_num), options)?;
                    zip.write_all(&image_bytes)?;
                    info!("Added slide_{}.png to ZIP", slide_num);
                }
                Err(e) => {
                    warn!("Error decoding image for slide {}: {}", slide_num, e);
                    zip.start_file(format!("slide_{}_decoding_error.txt", slide_num), options)?;
                    write!(zip, "Could not decode image: {}", e)?;
                }
            }
        } else if image_url.starts_with("http") {
            info!("Slide {} has a placeholder/link image, adding as text", slide_num);
            zip.start_file(format!("slide_{}_image_link.txt", slide_num), options)?;
            write!(
                zip,
                "Image was a placeholder/link: {}\nAssociated prompt: {}",
                image_url, prompt
            )?;
        } else {
            info!("Slide {} has no valid image data, adding as text", slide_num);
            zip.start_file(format!("slide_{}_no_image.txt", slide_num), options)?;
            write!(
                zip,
                "No valid image data found for this slide.\nAssociated prompt: {}",
                prompt
            )?;
        }
    }

    zip.start_file(TEXT_ENTRY_NAME, options)?;
    zip.write_all(all_sentences.join("\n").as_bytes())?;

    let cursor = zip.finish()?;
    info!("ZIP file created");
    Ok(cursor.into_inner())
}
