use super::*;

fn rgb8(r: u8, g: u8, b: u8) -> [f32; 3] {
    [
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
    ]
}

#[test]
fn exact_key_color_is_transparent() {
    let p = KeyParams::default();
    assert_eq!(key_alpha(p.key_color, &p), 0.0);
}

#[test]
fn eight_bit_key_color_is_transparent() {
    let p = KeyParams::default();
    assert_eq!(key_pixel([0, 255, 8, 255], &p)[3], 0);
}

#[test]
fn pure_red_is_opaque() {
    let p = KeyParams::default();
    let rgb = rgb8(255, 0, 0);
    assert!((key_distance(rgb, &p) - 1.4146).abs() < 1e-3);
    assert_eq!(key_alpha(rgb, &p), 1.0);
    assert_eq!(key_pixel([255, 0, 0, 255], &p), [255, 0, 0, 255]);
}

#[test]
fn green_fringe_is_suppressed_by_spill() {
    let p = KeyParams::default();
    let rgb = rgb8(0, 200, 40);
    assert!(spill_amount(rgb) > p.spill_high);
    assert_eq!(key_alpha(rgb, &p), 0.0);
}

#[test]
fn far_colors_without_spill_are_opaque() {
    let p = KeyParams::default();
    let samples = [
        [1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 1.0, 1.0],
        [0.0, 0.0, 0.0],
        [0.8, 0.5, 0.1],
        [0.2, 0.3, 0.9],
        [0.6, 0.4, 0.6],
    ];
    for rgb in samples {
        assert!(key_distance(rgb, &p) >= 0.60, "{rgb:?}");
        assert!(spill_amount(rgb) <= p.spill_low, "{rgb:?}");
        assert_eq!(key_alpha(rgb, &p), 1.0, "{rgb:?}");
    }
}

#[test]
fn strong_spill_always_keys_out() {
    let p = KeyParams::default();
    for r in 0..=10 {
        for b in 0..=10 {
            let r = r as f32 * 0.04;
            let b = b as f32 * 0.04;
            let g = (r.max(b) + 0.55).min(1.0);
            let rgb = [r, g, b];
            if spill_amount(rgb) >= 0.55 {
                assert_eq!(key_alpha(rgb, &p), 0.0, "{rgb:?}");
            }
        }
    }
}

#[test]
fn primary_alpha_is_monotonic_in_distance() {
    let p = KeyParams::default();
    let mut prev = primary_alpha(0.0, &p);
    assert_eq!(prev, 0.0);
    for i in 1..=200 {
        let d = i as f32 * 0.01;
        let a = primary_alpha(d, &p);
        assert!(a >= prev, "alpha decreased at distance {d}");
        prev = a;
    }
    assert_eq!(prev, 1.0);
}

#[test]
fn key_alpha_never_decreases_with_distance_at_fixed_spill() {
    let p = KeyParams::default();
    for spill in [0.0f32, 0.2, 0.35, 0.45, 0.6] {
        let mut samples = Vec::new();
        for r in 0..=25 {
            for b in 0..=25 {
                let (r, b) = (r as f32 * 0.04, b as f32 * 0.04);
                let g = r.max(b) + spill;
                if g <= 1.0 {
                    samples.push([r, g, b]);
                }
            }
        }
        samples.sort_by(|x, y| key_distance(*x, &p).total_cmp(&key_distance(*y, &p)));

        let mut prev = 0.0f32;
        for rgb in samples {
            assert!((spill_amount(rgb) - spill).abs() < 1e-5, "{rgb:?}");
            let a = key_alpha(rgb, &p);
            assert!(a >= prev - 1e-5, "alpha fell to {a} from {prev} at {rgb:?} (spill {spill})");
            prev = prev.max(a);
        }
    }
}

#[test]
fn alpha_is_min_of_both_passes() {
    let p = KeyParams::default();
    for r in (0..=255).step_by(51) {
        for g in (0..=255).step_by(51) {
            for b in (0..=255).step_by(51) {
                let rgb = rgb8(r as u8, g as u8, b as u8);
                let expected = primary_alpha(key_distance(rgb, &p), &p)
                    .min(spill_multiplier(spill_amount(rgb), &p));
                assert_eq!(key_alpha(rgb, &p), expected);
            }
        }
    }
}

#[test]
fn keying_never_touches_rgb() {
    let p = KeyParams::default();
    let mut buf = Vec::new();
    for r in (0..=255u16).step_by(17) {
        for g in (0..=255u16).step_by(17) {
            buf.extend_from_slice(&[r as u8, g as u8, (255 - r) as u8, 255]);
        }
    }
    let before = buf.clone();
    key_rgba8_in_place(&mut buf, &p).unwrap();
    for (a, b) in before.chunks_exact(4).zip(buf.chunks_exact(4)) {
        assert_eq!(a[..3], b[..3]);
        assert!(b[3] <= a[3]);
    }
}

#[test]
fn source_alpha_scales_the_matte() {
    let p = KeyParams::default();
    assert_eq!(key_pixel([255, 0, 0, 128], &p), [255, 0, 0, 128]);
    assert_eq!(key_pixel([0, 255, 8, 128], &p)[3], 0);
}

#[test]
fn in_place_rejects_partial_pixels() {
    let mut buf = vec![0u8; 7];
    assert!(key_rgba8_in_place(&mut buf, &KeyParams::default()).is_err());
}
