use jump_tempo::analysis::{
    decode_to_mono, estimate_bpm, JobStatus, MonoStream, SpectralPeakConfig, SpectralPeakEstimator, TempoWorker, TimeBase,
};
use std::f32::consts::PI;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const SAMPLE_RATE: u32 = 22050;

/// Decaying 1 kHz bursts every `period` seconds
fn click_track(seconds: f32, period: f32) -> Vec<f32> {
    let len = (SAMPLE_RATE as f32 * seconds) as usize;
    let burst = (SAMPLE_RATE as f32 * 0.02) as usize;
    let step = (SAMPLE_RATE as f32 * period) as usize;

    let mut samples = vec![0.0f32; len];
    let mut start = step / 2;
    while start + burst < len {
        for n in 0..burst {
            let t = n as f32 / SAMPLE_RATE as f32;
            samples[start + n] = 0.8 * (2.0 * PI * 1000.0 * t).sin() * (1.0 - n as f32 / burst as f32);
        }
        start += step;
    }
    samples
}

/// Minimal 16-bit mono PCM WAV file
fn write_wav(path: &Path, samples: &[f32]) {
    let data_len = (samples.len() * 2) as u32;
    let mut bytes = Vec::with_capacity(44 + data_len as usize);

    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
    bytes.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    bytes.extend_from_slice(&(SAMPLE_RATE * 2).to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    for &s in samples {
        let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        bytes.extend_from_slice(&v.to_le_bytes());
    }

    fs::write(path, bytes).unwrap();
}

fn hop_estimator() -> Arc<SpectralPeakEstimator> {
    Arc::new(SpectralPeakEstimator::new(SpectralPeakConfig {
        time_base: TimeBase::Hops,
        ..SpectralPeakConfig::default()
    }))
}

#[test]
fn test_all_zero_waveform_is_zero_bpm() {
    assert_eq!(estimate_bpm(&vec![0.0; SAMPLE_RATE as usize * 3], SAMPLE_RATE), 0.0);
}

#[test]
fn test_wav_file_round_trip_through_worker() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("clicks.wav");
    write_wav(&path, &click_track(12.0, 0.6));

    let (samples, sample_rate) = decode_to_mono(&path).unwrap();
    assert_eq!(sample_rate, SAMPLE_RATE);
    assert!(samples.len() >= SAMPLE_RATE as usize * 11);

    let (worker, events) = TempoWorker::new(hop_estimator(), Some(1)).unwrap();
    let id = worker.submit_file(path.clone());

    let event = events.recv_timeout(Duration::from_secs(60)).unwrap();
    assert_eq!(event.id, id);
    match event.status {
        JobStatus::Done { bpm } => assert!((bpm - 100.0).abs() < 3.0, "got {}", bpm),
        other => panic!("unexpected status {:?}", other),
    }
    assert!(matches!(worker.status(id), Some(JobStatus::Done { .. })));
}

#[test]
fn test_mono_stream_yields_every_sample() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("short.wav");
    let clicks = click_track(2.0, 0.5);
    write_wav(&path, &clicks);

    let stream = MonoStream::open(&path).unwrap();
    assert_eq!(stream.sample_rate(), SAMPLE_RATE);

    let total: usize = stream.map(|chunk| chunk.len()).sum();
    assert_eq!(total, clicks.len());
}

#[test]
fn test_jobs_are_independent() {
    let (worker, events) = TempoWorker::new(hop_estimator(), Some(2)).unwrap();

    let silent = worker.submit_waveform(vec![0.0; 8192], SAMPLE_RATE);
    let clicks = worker.submit_waveform(click_track(12.0, 0.6), SAMPLE_RATE);
    let broken = worker.submit_file("/nonexistent/track.flac".into());

    let mut finished = 0;
    for event in events.iter().take(3) {
        finished += 1;
        match event.status {
            JobStatus::Done { bpm } if event.id == silent => assert_eq!(bpm, 0.0),
            JobStatus::Done { bpm } if event.id == clicks => assert!((bpm - 100.0).abs() < 3.0),
            JobStatus::Failed { .. } if event.id == broken => {}
            ref status => panic!("job {} ended as {:?}", event.id, status),
        }
    }
    assert_eq!(finished, 3);
}
