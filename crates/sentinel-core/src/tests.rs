#[cfg(test)]
mod tests {
    use glam::{DQuat, DVec3};

    use crate::config::{AimSmoothing, TurretConfig};
    use crate::constants::*;
    use crate::enums::*;
    use crate::error::ConfigError;
    use crate::events::TurretEvent;
    use crate::types::{ElapsedTimer, EntityId, LayerMask, SimTime, Transform};

    // ---- Configuration ----

    #[test]
    fn test_config_empty_json_uses_defaults() {
        let config: TurretConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, TurretConfig::default());
        assert_eq!(config.target_tag.as_deref(), Some("Player"));
        assert_eq!(config.muzzle_name.as_deref(), Some("Muzzle"));
        assert_eq!(config.max_distance, 25.0);
        assert_eq!(config.target_offset, DVec3::new(0.0, 1.2, 0.0));
        assert!(config.require_line_of_sight);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_partial_json_overrides() {
        let json = r#"{
            "target_tag": "Enemy",
            "max_distance": 40.0,
            "target_offset": [0.0, 0.5, 0.0],
            "raycast_mask_bit": 3,
            "aim_smoothing": { "mode": "Exponential", "smoothing": 0.2 }
        }"#;
        let config: TurretConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.target_tag.as_deref(), Some("Enemy"));
        assert_eq!(config.max_distance, 40.0);
        assert_eq!(config.target_offset, DVec3::new(0.0, 0.5, 0.0));
        assert_eq!(config.visibility_mask(), Some(LayerMask(1 << 3)));
        assert_eq!(config.aim_smoothing, AimSmoothing::Exponential { smoothing: 0.2 });
        // Untouched fields keep their defaults.
        assert_eq!(config.fire_interval, DEFAULT_FIRE_INTERVAL);
    }

    #[test]
    fn test_config_rejects_negative_distance() {
        let config = TurretConfig {
            max_distance: -1.0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::Negative {
                field: "max_distance",
                value: -1.0
            })
        );
    }

    #[test]
    fn test_config_rejects_nan() {
        let config = TurretConfig {
            reacquire_interval: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFinite {
                field: "reacquire_interval",
                ..
            })
        ));
    }

    #[test]
    fn test_config_rejects_mask_bit_out_of_range() {
        let config = TurretConfig {
            raycast_mask_bit: Some(32),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::MaskBitOutOfRange(32)));
    }

    #[test]
    fn test_config_rejects_full_smoothing() {
        let config = TurretConfig {
            aim_smoothing: AimSmoothing::Exponential { smoothing: 1.0 },
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::SmoothingOutOfRange(1.0)));
    }

    #[test]
    fn test_config_allows_disabled_firing() {
        let config = TurretConfig {
            fire_interval: 0.0,
            projectile_speed: -1.0,
            projectile_lifetime: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tracer_length_is_half_max_distance() {
        let config = TurretConfig {
            max_distance: 30.0,
            ..Default::default()
        };
        assert_eq!(config.tracer_length(), 15.0);
    }

    // ---- Types ----

    #[test]
    fn test_layer_mask_from_bit() {
        assert_eq!(LayerMask::from_bit(0), Some(LayerMask(1)));
        assert_eq!(LayerMask::from_bit(31), Some(LayerMask(1 << 31)));
        assert_eq!(LayerMask::from_bit(32), None);
        assert!(LayerMask(0b0110).intersects(LayerMask(0b0100)));
        assert!(!LayerMask(0b0110).intersects(LayerMask(0b1001)));
    }

    #[test]
    fn test_elapsed_timer() {
        let mut timer = ElapsedTimer::new();
        timer.advance(0.25);
        timer.advance(0.25);
        assert!(timer.has_reached(0.5));
        assert!(!timer.has_reached(0.6));
        timer.reset();
        assert_eq!(timer.get(), 0.0);

        // Non-finite and negative steps are ignored.
        timer.advance(f64::NAN);
        timer.advance(-1.0);
        assert_eq!(timer.get(), 0.0);

        let charged = ElapsedTimer::starting_at(0.75);
        assert!(charged.has_reached(0.75));
    }

    #[test]
    fn test_sim_time_advance() {
        let mut time = SimTime::default();
        for _ in 0..TICK_RATE {
            time.advance(DT);
        }
        assert_eq!(time.tick, TICK_RATE as u64);
        assert!((time.elapsed_secs - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_transform_forward_and_scale() {
        let t = Transform::default();
        assert_eq!(t.forward(), DEFAULT_FORWARD);

        let squashed = Transform {
            scale: DVec3::new(1.0, 1.0, 0.0),
            ..Default::default()
        };
        assert_eq!(squashed.forward().length(), 0.0);
    }

    #[test]
    fn test_transform_composition() {
        let parent = Transform {
            position: DVec3::new(10.0, 0.0, 0.0),
            rotation: DQuat::from_rotation_y(std::f64::consts::FRAC_PI_2),
            scale: DVec3::ONE,
        };
        // One unit in front of the parent.
        let child = Transform::from_position(DVec3::new(0.0, 0.0, -1.0));
        let world = parent.mul_transform(&child);
        let expected = DVec3::new(9.0, 0.0, 0.0);
        assert!((world.position - expected).length() < 1e-9);
        assert!((world.forward() - DVec3::new(-1.0, 0.0, 0.0)).length() < 1e-9);
    }

    // ---- Enums & events ----

    #[test]
    fn test_engagement_state_serde() {
        for v in [EngagementState::NoTarget, EngagementState::Tracking] {
            let json = serde_json::to_string(&v).unwrap();
            let back: EngagementState = serde_json::from_str(&json).unwrap();
            assert_eq!(v, back);
        }
    }

    #[test]
    fn test_turret_event_is_tagged() {
        let event = TurretEvent::ShotHeld {
            turret: EntityId(1),
            target: EntityId(2),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"ShotHeld\""));
        let back: TurretEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.turret(), EntityId(1));
    }

    #[test]
    fn test_empty_snapshot_serializes() {
        let snapshot = crate::state::Snapshot::default();
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["time"]["tick"], 0);
        assert!(json["turrets"].as_array().unwrap().is_empty());
        assert!(json["events"].as_array().unwrap().is_empty());
    }
}
