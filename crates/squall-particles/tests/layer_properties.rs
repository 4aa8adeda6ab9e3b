use std::collections::HashSet;

use squall_core::{EffectKind, Rgba};
use squall_particles::{
    DisintegrationConfig, DisintegrationSystem, EffectLayer, EffectsConfig, LayerConfig,
    ParticleRng, Raster, SpawnGrid,
};

#[test]
fn pool_size_holds_for_every_preset() {
    for kind in EffectKind::LAYERS {
        let config = LayerConfig::preset(kind).unwrap();
        let expected = config.pool_size;
        let mut layer = EffectLayer::with_seed(kind, config, 720.0, 1280.0, 9).unwrap();
        layer.initialize(0).unwrap();

        let mut now = 0;
        while now < 10_000 {
            layer.tick(now).unwrap();
            assert_eq!(layer.pool().len(), expected, "{kind}");
            assert_eq!(layer.world().group_count(), expected, "{kind}");
            let handles: HashSet<_> = layer.pool().handles().collect();
            assert_eq!(handles.len(), expected, "{kind}");
            now += 97;
        }
        assert!(layer.stats().recycled_total > 0, "{kind}");
    }
}

#[test]
fn particle_cap_is_never_exceeded() {
    let mut config = LayerConfig::rain();
    config.max_particles = 40;
    let mut layer = EffectLayer::with_seed(EffectKind::Rain, config, 1080.0, 1920.0, 5).unwrap();
    layer.initialize(0).unwrap();
    for i in 0..200 {
        layer.tick(i * 40).unwrap();
        assert!(layer.world().particle_count() <= 40);
    }
}

#[test]
fn spawn_buckets_rotate() {
    let mut grid = SpawnGrid::new(5);
    let seq: Vec<usize> = (0..15).map(|_| grid.next_bucket()).collect();
    for window in seq.windows(5) {
        let set: HashSet<_> = window.iter().copied().collect();
        assert_eq!(set.len(), 5);
    }
}

#[test]
fn config_file_feeds_layers() {
    let effects = EffectsConfig::from_toml_str(
        r#"
[rain]
pool_size = 4
lifetime_ms = 500
"#,
    )
    .unwrap();
    let config = effects.layer(EffectKind::Rain).unwrap().clone();
    let mut layer = EffectLayer::with_seed(EffectKind::Rain, config, 400.0, 800.0, 1).unwrap();
    layer.initialize(0).unwrap();
    assert_eq!(layer.world().group_count(), 4);
    assert!(effects.layer(EffectKind::None).is_none());
}

#[test]
fn disintegration_runs_to_completion() {
    let raster = Raster::filled(32, 32, Rgba::new(30, 60, 90, 255));
    let mut system =
        DisintegrationSystem::with_rng(DisintegrationConfig::default(), ParticleRng::new(11));
    let total = system.init_from_raster(&raster, 32, 32);
    assert_eq!(total, 64);

    let dt = 1.0 / 60.0;
    let mut progress = 0.0_f32;
    let mut frames = 0;
    while !system.is_complete() {
        progress = (progress + 0.7 * dt).min(1.0);
        system.update(progress, dt);
        let active = system.active_particles().count();
        let inactive = system.inactive_particles().count();
        assert!(active + inactive <= total);
        frames += 1;
        assert!(frames < 600, "transition never finished");
    }
    assert!(system.particles().iter().all(|p| p.active && p.alpha == 0));
}

#[test]
fn empty_raster_completes_immediately() {
    let mut system = DisintegrationSystem::new(DisintegrationConfig::default());
    let raster = Raster::filled(16, 16, Rgba::TRANSPARENT);
    assert_eq!(system.init_from_raster(&raster, 16, 16), 0);
    assert!(system.is_complete());
    system.update(0.5, 0.016);
    assert!(system.is_empty());
}
