use std::path::Path;

use ffmpeg_next::format::sample::Type as SampleType;
use ffmpeg_next::format::Sample;
use ffmpeg_next::util::frame::audio::Audio as AudioFrame;
use ffmpeg_next::ChannelLayout;

use crate::audio::domain::audio_reader::AudioReader;
use crate::audio::domain::audio_segment::AudioSegment;

/// Decodes the audio track of an MP3 or MP4 file using ffmpeg-next.
///
/// Sample rate and channel layout are kept as decoded; only the sample
/// format is normalized to packed f32.
pub struct FfmpegAudioReader;

impl AudioReader for FfmpegAudioReader {
    fn read_audio(&self, path: &Path) -> Result<Option<AudioSegment>, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let mut ictx = ffmpeg_next::format::input(path)?;

        let audio_stream = match ictx.streams().best(ffmpeg_next::media::Type::Audio) {
            Some(stream) => stream,
            None => return Ok(None),
        };
        let audio_stream_index = audio_stream.index();

        let codec_ctx =
            ffmpeg_next::codec::context::Context::from_parameters(audio_stream.parameters())?;
        let mut decoder = codec_ctx.decoder().audio()?;

        let channels = decoder.channels() as u16;
        let sample_rate = decoder.rate();
        let layout = if decoder.channel_layout().is_empty() {
            ChannelLayout::default(channels as i32)
        } else {
            decoder.channel_layout()
        };

        log::debug!(
            "Decoding {} ({sample_rate} Hz, {channels} channel(s))",
            path.display()
        );

        let mut resampler = ffmpeg_next::software::resampling::Context::get(
            decoder.format(),
            layout,
            sample_rate,
            Sample::F32(SampleType::Packed),
            layout,
            sample_rate,
        )?;

        let mut all_samples: Vec<f32> = Vec::new();
        let mut decoded_frame = AudioFrame::empty();
        let mut resampled_frame = AudioFrame::empty();

        for (stream, packet) in ictx.packets() {
            if stream.index() != audio_stream_index {
                continue;
            }

            decoder.send_packet(&packet)?;

            while decoder.receive_frame(&mut decoded_frame).is_ok() {
                resampler.run(&decoded_frame, &mut resampled_frame)?;
                extract_packed_samples(&resampled_frame, channels, &mut all_samples);
            }
        }

        decoder.send_eof()?;
        while decoder.receive_frame(&mut decoded_frame).is_ok() {
            resampler.run(&decoded_frame, &mut resampled_frame)?;
            extract_packed_samples(&resampled_frame, channels, &mut all_samples);
        }

        // The resampler may still hold buffered samples
        if let Ok(Some(delay)) = resampler.flush(&mut resampled_frame) {
            if delay.output > 0 {
                extract_packed_samples(&resampled_frame, channels, &mut all_samples);
            }
        }

        Ok(Some(AudioSegment::new(all_samples, sample_rate, channels)))
    }
}

/// Append the interleaved f32 samples of a packed frame.
fn extract_packed_samples(frame: &AudioFrame, channels: u16, out: &mut Vec<f32>) {
    let count = frame.samples() * channels as usize;
    if count == 0 {
        return;
    }
    let data = frame.data(0);
    let available = data.len() / std::mem::size_of::<f32>();
    let count = count.min(available);
    let floats = unsafe { std::slice::from_raw_parts(data.as_ptr() as *const f32, count) };
    out.extend_from_slice(floats);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;
    use std::path::Path;

    /// Encode a mono 440 Hz tone as AAC inside an MP4 container.
    fn write_aac_mp4(path: &Path, sample_rate: u32, frames: usize) {
        ffmpeg_next::init().unwrap();
        let mut octx = ffmpeg_next::format::output(path).unwrap();
        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::flag::Flags::GLOBAL_HEADER);

        let aac = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::AAC).unwrap();
        let mut ost = octx.add_stream(Some(aac)).unwrap();
        let stream_index = ost.index();

        let mut encoder = ffmpeg_next::codec::context::Context::new_with_codec(aac)
            .encoder()
            .audio()
            .unwrap();
        encoder.set_rate(sample_rate as i32);
        encoder.set_channel_layout(ChannelLayout::MONO);
        encoder.set_format(Sample::F32(SampleType::Planar));
        encoder.set_time_base((1, sample_rate as i32));
        if global_header {
            encoder.set_flags(ffmpeg_next::codec::flag::Flags::GLOBAL_HEADER);
        }
        let mut encoder = encoder.open_as(aac).unwrap();
        ost.set_parameters(&encoder);

        octx.write_header().unwrap();
        let encoder_tb = encoder.time_base();
        let stream_tb = octx.stream(stream_index).unwrap().time_base();
        let frame_size = match encoder.frame_size() {
            0 => 1024,
            n => n as usize,
        };

        let tone: Vec<f32> = (0..frames)
            .map(|i| (2.0 * PI * 440.0 * i as f32 / sample_rate as f32).sin() * 0.5)
            .collect();

        let write_packets = |encoder: &mut ffmpeg_next::codec::encoder::audio::Encoder,
                             octx: &mut ffmpeg_next::format::context::Output| {
            let mut packet = ffmpeg_next::Packet::empty();
            while encoder.receive_packet(&mut packet).is_ok() {
                packet.set_stream(stream_index);
                packet.rescale_ts(encoder_tb, stream_tb);
                packet.write_interleaved(octx).unwrap();
            }
        };

        let mut pts = 0i64;
        for chunk in tone.chunks(frame_size) {
            let mut frame =
                AudioFrame::new(Sample::F32(SampleType::Planar), chunk.len(), ChannelLayout::MONO);
            frame.set_rate(sample_rate);
            frame.set_pts(Some(pts));
            for (dst, sample) in frame.data_mut(0).chunks_exact_mut(4).zip(chunk) {
                dst.copy_from_slice(&sample.to_ne_bytes());
            }
            encoder.send_frame(&frame).unwrap();
            write_packets(&mut encoder, &mut octx);
            pts += chunk.len() as i64;
        }
        encoder.send_eof().unwrap();
        write_packets(&mut encoder, &mut octx);
        octx.write_trailer().unwrap();
    }

    #[test]
    fn test_read_audio_nonexistent_file() {
        let reader = FfmpegAudioReader;
        let path = if cfg!(windows) {
            Path::new("Z:\\nonexistent\\file.mp3")
        } else {
            Path::new("/nonexistent/file.mp3")
        };
        assert!(reader.read_audio(path).is_err());
    }

    #[test]
    fn test_read_audio_decodes_pcm_wav_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for i in 0..22050 {
            let v = ((i as f32 / 20.0).sin() * 8000.0) as i16;
            writer.write_sample(v).unwrap();
            writer.write_sample(v).unwrap();
        }
        writer.finalize().unwrap();

        let audio = FfmpegAudioReader.read_audio(&path).unwrap().unwrap();
        assert_eq!(audio.sample_rate(), 22050);
        assert_eq!(audio.channels(), 2);
        assert!(audio.frames() > 20000);
        assert!(audio.samples().iter().all(|s| (-1.0..=1.0).contains(s)));
    }

    #[test]
    fn test_read_audio_decodes_aac_in_mp4() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.mp4");
        write_aac_mp4(&path, 16000, 16 * 1024);

        let audio = FfmpegAudioReader.read_audio(&path).unwrap().unwrap();
        assert_eq!(audio.sample_rate(), 16000);
        assert_eq!(audio.channels(), 1);
        assert!(audio.frames() >= 15 * 1024, "decoded {} frames", audio.frames());
        let peak = audio.samples().iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak > 0.25, "decoded tone is too quiet (peak {peak})");
    }
}
