use nalgebra::Vector2;
use pitchmap_core::{
    synthetic::{noise::PixelNoise, pitch},
    transform_point, CorrespondenceSet, HotMask, Mat3, Pt2, ReferenceResolution,
};
use pitchmap_linear::fit_homography;
use pitchmap_poi::{reduce_hot_poi, removal_error, PoiError};

fn warp() -> Mat3 {
    Mat3::new(0.8, 0.1, 0.05, -0.05, 0.7, 0.1, 0.1, 0.2, 1.0)
}

fn noisy_set(template: Vec<Pt2>, seed: u64, max_px: f64) -> CorrespondenceSet {
    let observed = pitch::observe(&warp(), &template, &PixelNoise::new(seed, max_px), 0);
    CorrespondenceSet::new(template, observed).unwrap()
}

#[test]
fn twenty_points_with_five_out_of_frame_reduce_to_five() {
    let mut set = noisy_set(pitch::grid_points_2d(5, 4), 11, 1.5);
    let hidden = [0usize, 4, 7, 15, 19];
    let outside = [
        Pt2::new(-0.2, 0.5),
        Pt2::new(1.3, 0.2),
        Pt2::new(0.4, -0.01),
        Pt2::new(0.5, 1.2),
        Pt2::new(-3.0, -3.0),
    ];
    for (&idx, &p) in hidden.iter().zip(outside.iter()) {
        set.observed[idx] = p;
    }

    let visible = set.visibility_mask();
    assert_eq!(visible.count_hot(), 15);
    for idx in hidden {
        assert!(!visible.is_hot(idx));
    }

    let red = reduce_hot_poi(&set, &visible, 5, ReferenceResolution::default()).unwrap();
    assert_eq!(red.steps.len(), 10);
    assert_eq!(red.mask.count_hot(), 5);
    for idx in hidden {
        assert!(!red.mask.is_hot(idx), "out-of-frame point {idx} became hot");
    }

    let h = fit_homography(&set.template, &set.observed, &red.mask).unwrap();
    assert!(h.iter().all(|v| v.is_finite()));
    assert!((h[(2, 2)] - 1.0).abs() < 1e-12);
}

#[test]
fn hot_count_is_min_of_target_and_initial() {
    let set = noisy_set(pitch::pitch_template(), 3, 1.0);
    let full = HotMask::all_hot(set.len());
    for target in [4usize, 5, 8, 33, 40] {
        let red = reduce_hot_poi(&set, &full, target, ReferenceResolution::default()).unwrap();
        assert_eq!(red.mask.count_hot(), target.min(33), "target {target}");
    }
}

#[test]
fn each_removal_is_the_cheapest_available() {
    let set = noisy_set(pitch::pitch_template(), 5, 1.5);
    let reference = ReferenceResolution::default();
    let initial = HotMask::all_hot(set.len());
    let red = reduce_hot_poi(&set, &initial, 5, reference).unwrap();

    let mut mask = initial;
    for step in &red.steps {
        for idx in mask.hot_indices() {
            if let Ok(alt) = removal_error(&set, &mask, idx, reference) {
                assert!(
                    alt >= step.error,
                    "removing {idx} gives {alt} < chosen {} ({})",
                    step.removed,
                    step.error
                );
                if alt == step.error {
                    assert!(idx >= step.removed, "tie not broken by lowest index");
                }
            }
        }
        assert!(mask.is_hot(step.removed));
        mask.set(step.removed, false);
    }
    assert_eq!(mask, red.mask);
}

#[test]
fn corrupted_points_are_dropped_before_clean_ones() {
    let mut set = noisy_set(pitch::grid_points_2d(4, 4), 9, 0.5);
    set.observed[5] += Vector2::new(0.06, 0.02);
    set.observed[10] += Vector2::new(-0.03, 0.05);

    let red = reduce_hot_poi(&set, &HotMask::all_hot(16), 14, ReferenceResolution::default())
        .unwrap();
    let mut removed: Vec<usize> = red.steps.iter().map(|s| s.removed).collect();
    removed.sort_unstable();
    assert_eq!(removed, vec![5, 10]);
    assert!(red.steps[1].error < red.steps[0].error);
}

#[test]
fn reduction_is_deterministic() {
    let set = noisy_set(pitch::pitch_template(), 21, 3.0);
    let mask = HotMask::all_hot(set.len());
    let a = reduce_hot_poi(&set, &mask, 5, ReferenceResolution::default()).unwrap();
    let b = reduce_hot_poi(&set, &mask, 5, ReferenceResolution::default()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn all_collinear_candidates_fail_the_round() {
    let template: Vec<Pt2> = (0..6).map(|i| Pt2::new(0.1 + 0.15 * i as f64, 0.4)).collect();
    let observed = template
        .iter()
        .map(|p| transform_point(&warp(), p, false))
        .collect();
    let set = CorrespondenceSet::new(template, observed).unwrap();

    let err = reduce_hot_poi(&set, &HotMask::all_hot(6), 5, ReferenceResolution::default())
        .unwrap_err();
    assert_eq!(err, PoiError::DegenerateRound { active: 6 });
    assert!(err.is_degenerate());
}
