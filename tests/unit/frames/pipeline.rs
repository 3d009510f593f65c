use std::sync::atomic::{AtomicUsize, Ordering};

use image::{Rgba, RgbaImage};

use super::*;
use crate::imaging::backend::CpuImaging;

/// Doubles each frame's width and records how often it ran.
#[derive(Default)]
struct Counting {
    calls: AtomicUsize,
    fail_on: Option<u8>,
}

impl FrameTransform for Counting {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn apply(&self, frame: &Frame, _imaging: &dyn ImagingBackend) -> MagikdResult<Frame> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let tag = frame.image().get_pixel(0, 0).0[0];
        if self.fail_on == Some(tag) {
            return Err(MagikdError::processing("bad pixel data"));
        }
        Ok(frame.with_image(RgbaImage::from_pixel(
            frame.width() * 2,
            frame.height(),
            Rgba([tag, 1, 2, 255]),
        )))
    }
}

fn tagged_source(n: usize) -> FrameSource {
    let frames = (0..n)
        .map(|i| Frame::new(RgbaImage::from_pixel(2, 1, Rgba([i as u8, 0, 0, 255]))))
        .collect();
    FrameSource::from_frames(frames).unwrap()
}

fn tags(seq: &FrameSequence) -> Vec<u8> {
    seq.frames()
        .iter()
        .map(|f| f.image().get_pixel(0, 0).0[0])
        .collect()
}

#[test]
fn frame_count_and_order_are_preserved() {
    for n in [1usize, 2, 17, MAX_FRAMES] {
        let t = Counting::default();
        let out = process(
            &tagged_source(n),
            &t,
            &CpuImaging::default(),
            &PipelineOpts::default(),
        )
        .unwrap();
        assert_eq!(out.len(), n);
        assert_eq!(tags(&out), (0..n as u8).collect::<Vec<_>>());
        assert_eq!(t.calls.load(Ordering::SeqCst), n);
        assert!(out.frames().iter().all(|f| f.dimensions() == (4, 1)));
    }
}

#[test]
fn single_frame_is_not_animated() {
    let out = process(
        &tagged_source(1),
        &Counting::default(),
        &CpuImaging::default(),
        &PipelineOpts::default(),
    )
    .unwrap();
    assert!(!out.is_animated());
}

#[test]
fn parallel_mode_restores_source_order() {
    let opts = PipelineOpts {
        parallel: true,
        ..PipelineOpts::default()
    }
    .with_threads(Some(3))
    .unwrap();
    let t = Counting::default();
    let out = process(&tagged_source(40), &t, &CpuImaging::default(), &opts).unwrap();
    assert_eq!(tags(&out), (0..40u8).collect::<Vec<_>>());
    assert_eq!(t.calls.load(Ordering::SeqCst), 40);
}

#[test]
fn over_limit_fails_before_any_transform() {
    let t = Counting::default();
    let err = process(
        &tagged_source(MAX_FRAMES + 1),
        &t,
        &CpuImaging::default(),
        &PipelineOpts::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        MagikdError::FrameLimitExceeded {
            frames: 61,
            max: 60
        }
    ));
    assert!(err.is_client_error());
    assert_eq!(t.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn limit_is_inclusive() {
    assert!(check_frame_limit(60, 60).is_ok());
    assert!(check_frame_limit(1, 60).is_ok());
    assert!(check_frame_limit(61, 60).is_err());
}

#[test]
fn one_failing_frame_fails_the_sequence() {
    for parallel in [false, true] {
        let t = Counting {
            fail_on: Some(3),
            ..Counting::default()
        };
        let opts = PipelineOpts {
            parallel,
            ..PipelineOpts::default()
        };
        let err = process(&tagged_source(8), &t, &CpuImaging::default(), &opts).unwrap_err();
        assert!(matches!(err, MagikdError::Processing(_)));
    }
}

#[test]
fn zero_threads_is_rejected_when_building_the_pool() {
    let err = PipelineOpts::default().with_threads(Some(0)).unwrap_err();
    assert!(err.is_client_error());
    assert_eq!(PipelineOpts::default().with_threads(None).unwrap().threads(), None);
}

/// Records the size of the pool each frame ran on.
#[derive(Default)]
struct PoolWidth {
    widths: std::sync::Mutex<Vec<usize>>,
}

impl FrameTransform for PoolWidth {
    fn name(&self) -> &'static str {
        "pool-width"
    }

    fn apply(&self, frame: &Frame, _imaging: &dyn ImagingBackend) -> MagikdResult<Frame> {
        self.widths.lock().unwrap().push(rayon::current_num_threads());
        Ok(frame.clone())
    }
}

#[test]
fn configured_pool_is_built_once_and_reused() {
    let opts = PipelineOpts {
        parallel: true,
        ..PipelineOpts::default()
    }
    .with_threads(Some(3))
    .unwrap();
    let shared = opts.clone();
    assert!(Arc::ptr_eq(
        opts.pool.as_ref().unwrap(),
        shared.pool.as_ref().unwrap()
    ));
    assert_eq!(opts.threads(), Some(3));

    for run in [&opts, &shared] {
        let t = PoolWidth::default();
        process(&tagged_source(6), &t, &CpuImaging::default(), run).unwrap();
        let widths = t.widths.lock().unwrap();
        assert_eq!(widths.len(), 6);
        assert!(widths.iter().all(|&n| n == 3), "{widths:?}");
    }
}

#[test]
fn empty_sequence_is_rejected() {
    assert!(FrameSequence::new(vec![]).is_err());
}
