use super::*;

#[test]
fn starts_green_and_spinning() {
    let sprite = SpriteState::default();
    assert_eq!(sprite.tint, Tint::GREEN);
    assert!(sprite.spin);
    assert_eq!(sprite.rotation, 0.0);
}

#[test]
fn spinning_sprite_turns_one_radian_per_second() {
    let mut sprite = SpriteState::default();
    sprite.advance(Duration::from_millis(1000));
    assert_eq!(sprite.rotation, 1.0);

    for delta_ms in [0_u64, 1, 16, 17, 33, 250, 6283] {
        let before = sprite.rotation;
        sprite.advance(Duration::from_millis(delta_ms));
        let expected = before + delta_ms as f64 / 1000.0;
        assert!(
            (sprite.rotation - expected).abs() < 1e-12,
            "delta {delta_ms}ms: {} != {expected}",
            sprite.rotation
        );
    }
}

#[test]
fn paused_sprite_keeps_rotation() {
    let mut sprite = SpriteState {
        rotation: 2.5,
        spin: false,
        ..SpriteState::default()
    };
    for delta_ms in [0_u64, 16, 1000, 60_000] {
        sprite.advance(Duration::from_millis(delta_ms));
        assert_eq!(sprite.rotation, 2.5);
    }
}

#[test]
fn toggle_flips_spin_back_and_forth() {
    let mut sprite = SpriteState::default();
    sprite.toggle_spin();
    assert!(!sprite.spin);
    sprite.toggle_spin();
    assert!(sprite.spin);
}
