use crate::error::DecodeError;
use crate::options::LoadOptions;
use crate::waveform::Waveform;
use std::fs::File;
use std::io::{Cursor, ErrorKind, Read};
use std::path::Path;
use symphonia::core::{
    audio::SampleBuffer,
    codecs::{DecoderOptions, CODEC_TYPE_NULL},
    errors::Error as SymphoniaError,
    formats::FormatOptions,
    io::{MediaSource, MediaSourceStream, ReadOnlySource},
    meta::MetadataOptions,
    probe::Hint,
};

/// Decode an audio file into a mono waveform
pub fn load_path(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Waveform, DecodeError> {
    let path = path.as_ref();
    tracing::debug!("Opening file: {:?}", path);

    let file = File::open(path)?;
    let extension = path.extension().and_then(|ext| ext.to_str());
    decode(Box::new(file), extension, options)
}

/// Decode an in-memory audio container
pub fn load_bytes(
    bytes: Vec<u8>,
    extension: Option<&str>,
    options: &LoadOptions,
) -> Result<Waveform, DecodeError> {
    decode(Box::new(Cursor::new(bytes)), extension, options)
}

/// Decode from any byte stream. The stream is not seekable, so containers
/// that need to seek (some MP4 layouts) should go through `load_path` instead.
pub fn load_reader<R>(
    reader: R,
    extension: Option<&str>,
    options: &LoadOptions,
) -> Result<Waveform, DecodeError>
where
    R: Read + Send + Sync + 'static,
{
    decode(Box::new(ReadOnlySource::new(reader)), extension, options)
}

fn decode(
    source: Box<dyn MediaSource>,
    extension: Option<&str>,
    options: &LoadOptions,
) -> Result<Waveform, DecodeError> {
    let mut hint = Hint::new();
    if let Some(extension) = extension {
        hint.with_extension(extension);
    }

    let mss = MediaSourceStream::new(source, Default::default());
    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| DecodeError::Unsupported(e.to_string()))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::NoTrack)?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| DecodeError::Unsupported(e.to_string()))?;

    let mut samples: Vec<f32> = Vec::new();
    let mut frame_limit: Option<usize> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(err)) if err.kind() == ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(err) => return Err(DecodeError::Decoder(err.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let audio_buffer = match decoder.decode(&packet) {
            Ok(audio_buffer) => audio_buffer,
            Err(SymphoniaError::DecodeError(reason)) => {
                tracing::warn!("Skipping undecodable packet: {}", reason);
                continue;
            }
            Err(err) => return Err(DecodeError::Decoder(err.to_string())),
        };

        let spec = *audio_buffer.spec();
        if sample_rate == 0 {
            sample_rate = spec.rate;
        }
        let channels = spec.channels.count();
        if channels == 0 || audio_buffer.frames() == 0 {
            continue;
        }

        let mut sample_buffer = SampleBuffer::<f32>::new(audio_buffer.capacity() as u64, spec);
        sample_buffer.copy_interleaved_ref(audio_buffer);

        // Down-mix to mono by averaging channels
        samples.extend(
            sample_buffer
                .samples()
                .chunks_exact(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32),
        );

        let limit = *frame_limit.get_or_insert_with(|| {
            options
                .max_duration
                .map(|d| (d.as_secs_f64() * sample_rate as f64).ceil() as usize)
                .unwrap_or(usize::MAX)
        });
        if samples.len() >= limit {
            samples.truncate(limit);
            tracing::debug!("Reached decode limit of {} samples", limit);
            break;
        }
    }

    tracing::debug!(
        "Decoded {} mono samples at {} Hz",
        samples.len(),
        sample_rate
    );

    let waveform = Waveform::new(samples, sample_rate)?;
    options.sample_rate.apply(waveform)
}
