use pitchmap_core::{
    reprojection_error,
    synthetic::{noise::PixelNoise, pitch},
    transform_points, HotMask, Mat3, Pt2, ReferenceResolution,
};
use pitchmap_linear::{dlt_homography, fit_homography, HomographyError};

fn known_homography() -> Mat3 {
    Mat3::new(1.1, 0.2, 0.05, -0.1, 0.9, 0.12, 0.15, -0.08, 1.0)
}

#[test]
fn four_point_fit_recovers_known_homography() {
    let h = known_homography();
    let template = vec![
        Pt2::new(0.1, 0.1),
        Pt2::new(0.9, 0.15),
        Pt2::new(0.85, 0.8),
        Pt2::new(0.2, 0.9),
    ];
    let observed = transform_points(&h, &template, false);

    let est = dlt_homography(&template, &observed).unwrap();
    let diff = (est - h).abs().max();
    assert!(diff < 1e-6, "max abs difference {diff}");

    let projected = transform_points(&est, &template, false);
    let err = reprojection_error(
        &observed,
        &projected,
        &HotMask::all_hot(4),
        ReferenceResolution::default(),
    )
    .unwrap();
    assert!(err < 1e-6, "reprojection error {err}");
}

#[test]
fn masked_fit_ignores_cold_outliers() {
    let h = known_homography();
    let template = pitch::grid_points_2d(4, 3);
    let mut observed = transform_points(&h, &template, false);
    observed[2] = Pt2::new(0.9, 0.9);
    observed[7] = Pt2::new(-0.4, 0.2);

    let mut mask = HotMask::all_hot(template.len());
    mask.set(2, false);
    mask.set(7, false);

    let est = fit_homography(&template, &observed, &mask).unwrap();
    assert!((est - h).abs().max() < 1e-9);

    let with_outliers = fit_homography(&template, &observed, &HotMask::all_hot(12)).unwrap();
    assert!((with_outliers - h).abs().max() > 1e-3);
}

#[test]
fn noisy_overdetermined_fit_has_small_error() {
    let template = pitch::pitch_template();
    let h = pitch::broadcast_homography(1.0);
    let observed = pitch::observe(&h, &template, &PixelNoise::new(42, 1.0), 0);
    let mask = HotMask::all_hot(template.len());

    let est = fit_homography(&template, &observed, &mask).unwrap();
    let projected = transform_points(&est, &template, false);
    let err =
        reprojection_error(&observed, &projected, &mask, ReferenceResolution::default()).unwrap();
    // Noise is bounded by 1 px per axis.
    assert!(err >= 0.0 && err < 2.0, "reprojection error {err}");
}

#[test]
fn three_hot_points_are_insufficient() {
    let template = pitch::grid_points_2d(2, 2);
    let mask = HotMask::from(vec![true, false, true, true]);
    assert_eq!(
        fit_homography(&template, &template, &mask),
        Err(HomographyError::InsufficientPoints { got: 3, min: 4 })
    );
}

#[test]
fn coincident_points_are_degenerate() {
    let template = vec![Pt2::new(0.5, 0.5); 4];
    let observed = pitch::grid_points_2d(2, 2);
    assert_eq!(
        dlt_homography(&template, &observed),
        Err(HomographyError::DegenerateConfiguration)
    );
}
