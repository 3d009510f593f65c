use image::{Delay, Rgba};

use super::*;
use crate::{
    effects::overlay::pride_flag_template, foundation::core::BoxSize,
    imaging::backend::CpuImaging,
};

fn textured_frame(w: u32, h: u32) -> Frame {
    let img = RgbaImage::from_fn(w, h, |x, y| {
        let v = ((x * 13 + y * 7) % 256) as u8;
        Rgba([v, 255 - v, v / 2, 255])
    });
    Frame::with_delay(img, Delay::from_numer_denom_ms(80, 1))
}

#[test]
fn distort_ends_at_three_quarters_of_the_fitted_size() {
    let params = DistortParams::with_bounds(BoxSize::new(20, 20).unwrap());
    let spec = TransformSpec::distort(params);
    let frame = textured_frame(40, 20);

    let out = spec.apply(&frame, &CpuImaging::default()).unwrap();
    assert_eq!(out.dimensions(), (15, 7));
    assert_eq!(params.output_size(40, 20), (15, 7));
    assert_eq!(out.delay(), frame.delay());
}

#[test]
fn distort_is_deterministic() {
    let spec = TransformSpec::distort(DistortParams::with_bounds(BoxSize::new(16, 16).unwrap()));
    let frame = textured_frame(16, 16);
    let imaging = CpuImaging::default();

    let a = spec.apply(&frame, &imaging).unwrap();
    let b = spec.apply(&frame, &imaging).unwrap();
    assert_eq!(a.dimensions(), (12, 12));
    assert_eq!(a.image().as_raw(), b.image().as_raw());
}

#[test]
fn pride_overlay_blends_flag_at_configured_opacity() {
    let imaging = CpuImaging::default();
    let params = OverlayParams {
        bounds: BoxSize::new(12, 12).unwrap(),
        opacity: 0.6,
    };
    let spec = TransformSpec::pride(&pride_flag_template(12, 12), params, &imaging).unwrap();

    let black = Frame::new(RgbaImage::from_pixel(12, 12, Rgba([0, 0, 0, 255])));
    let out = spec.apply(&black, &imaging).unwrap();
    assert_eq!(out.dimensions(), (12, 12));

    let top_left = out.image().get_pixel(0, 0).0;
    assert_eq!(top_left[0], 137);
    assert_eq!(top_left[3], 255);
}

#[test]
fn pride_rejects_out_of_range_opacity() {
    let params = OverlayParams {
        bounds: BoxSize::new(4, 4).unwrap(),
        opacity: 1.5,
    };
    let err = TransformSpec::pride(&pride_flag_template(4, 4), params, &CpuImaging::default())
        .unwrap_err();
    assert!(err.is_client_error());
}

#[test]
fn zero_box_is_an_error_not_a_panic() {
    assert!(
        serde_json::from_str::<DistortParams>(r#"{"bounds": {"width": 0, "height": 800}}"#)
            .is_err()
    );
    assert!(
        serde_json::from_str::<OverlayParams>(r#"{"bounds": {"width": 8, "height": 0}}"#)
            .is_err()
    );

    let zero = BoxSize {
        width: 0,
        height: 800,
    };
    let spec = TransformSpec::distort(DistortParams::with_bounds(zero));
    let err = spec
        .apply(&textured_frame(10, 10), &CpuImaging::default())
        .unwrap_err();
    assert!(err.is_client_error());

    let params = OverlayParams {
        bounds: zero,
        opacity: 0.5,
    };
    let err = TransformSpec::pride(&pride_flag_template(4, 4), params, &CpuImaging::default())
        .unwrap_err();
    assert!(err.is_client_error());
}

#[test]
fn names_identify_the_effect() {
    assert_eq!(TransformSpec::distort(DistortParams::default()).name(), "distort");
    let spec = TransformSpec::pride(
        &pride_flag_template(4, 4),
        OverlayParams {
            bounds: BoxSize::new(4, 4).unwrap(),
            opacity: 0.5,
        },
        &CpuImaging::default(),
    )
    .unwrap();
    assert_eq!(spec.name(), "pride");
}
