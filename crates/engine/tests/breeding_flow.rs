use breeder_engine::{BreedError, BreedingConfig, BreedingEngine, CrossoverStrategy};
use breeder_profile::{Artifact, Category, FeatureProfile};

const DRUMS: &str = "sound(\"bd ~ sd hh bd sd\").gain(0.9)";
const KEYS: &str = "note(\"c4 e4 g4 b4\").sound(\"piano\").gain(0.5).room(0.3)";

fn profile(content: &str) -> FeatureProfile {
    FeatureProfile::from_artifact(&Artifact::new(content, "parent"))
}

fn deterministic_engine() -> BreedingEngine {
    BreedingEngine::new(BreedingConfig {
        novelty_intensity: 0.0,
        mutation_seed: Some(17),
    })
}

#[test]
fn offspring_stays_within_feature_bounds() {
    let engine = BreedingEngine::new(BreedingConfig {
        mutation_seed: Some(5),
        ..BreedingConfig::default()
    });
    let a = profile(DRUMS);
    let b = profile(KEYS);

    for strategy in [
        CrossoverStrategy::Dominant,
        CrossoverStrategy::Balanced,
        CrossoverStrategy::Hybrid,
        CrossoverStrategy::Adaptive,
    ] {
        let offspring = engine.breed(&a, &b, strategy).unwrap();
        for category in Category::ALL {
            let Some(values) = offspring.profile.category(category) else {
                continue;
            };
            assert_eq!(values.len(), category.dimension());
            for v in values {
                assert!((0.0..=1.0).contains(v), "{strategy:?} {category:?} {v}");
            }
        }
        assert!((0.0..=1.0).contains(&offspring.compatibility.overall));
        assert!((0.0..=1.0).contains(&offspring.fitness));
    }
}

#[test]
fn compatibility_is_symmetric() {
    let a = profile(DRUMS);
    let b = profile(KEYS);

    let ab = BreedingEngine::compatibility(&a, &b).unwrap();
    let ba = BreedingEngine::compatibility(&b, &a).unwrap();

    assert!((ab.overall - ba.overall).abs() < 1e-12);
    for category in Category::ALL {
        assert!((ab.category(category) - ba.category(category)).abs() < 1e-12);
    }
}

#[test]
fn self_compatibility_is_perfect() {
    let p = profile(KEYS);
    let compat = BreedingEngine::compatibility(&p, &p).unwrap();
    assert!((compat.overall - 1.0).abs() < 1e-12);
}

#[test]
fn self_breed_without_novelty_clones_the_parent() {
    let p = profile(KEYS);
    let offspring = deterministic_engine()
        .breed(&p, &p, CrossoverStrategy::Balanced)
        .unwrap();
    assert_eq!(offspring.profile, p);
}

#[test]
fn same_seed_breeds_identical_offspring() {
    let a = profile(DRUMS);
    let b = profile(KEYS);
    let config = BreedingConfig {
        novelty_intensity: 0.25,
        mutation_seed: Some(99),
    };

    let first = BreedingEngine::new(config.clone())
        .breed(&a, &b, CrossoverStrategy::Adaptive)
        .unwrap();
    let second = BreedingEngine::new(config)
        .breed(&a, &b, CrossoverStrategy::Adaptive)
        .unwrap();

    assert_eq!(first, second);
}

#[test]
fn balanced_offspring_sits_between_parents() {
    let mut a = FeatureProfile::empty();
    let mut b = FeatureProfile::empty();
    a.set_category(Category::Melodic, vec![0.2, 0.2, 0.2, 0.2]);
    b.set_category(Category::Melodic, vec![0.8, 0.8, 0.8, 0.8]);

    let offspring = deterministic_engine()
        .breed(&a, &b, CrossoverStrategy::Balanced)
        .unwrap();

    assert_eq!(
        offspring.profile.category(Category::Melodic),
        Some(&[0.5, 0.5, 0.5, 0.5][..])
    );
}

#[test]
fn one_sided_category_is_inherited_intact() {
    let mut a = FeatureProfile::empty();
    a.set_category(Category::Rhythmic, vec![0.7, 0.1, 0.4, 0.0, 1.0]);
    let mut b = FeatureProfile::empty();
    b.set_category(Category::Textural, vec![0.1, 0.5, 0.0, 0.25]);

    let offspring = deterministic_engine()
        .breed(&a, &b, CrossoverStrategy::Dominant)
        .unwrap();

    assert_eq!(
        offspring.profile.category(Category::Rhythmic),
        a.category(Category::Rhythmic)
    );
    assert_eq!(
        offspring.profile.category(Category::Textural),
        b.category(Category::Textural)
    );
}

#[test]
fn featureless_parents_are_rejected() {
    let err = deterministic_engine()
        .breed(
            &FeatureProfile::empty(),
            &FeatureProfile::empty(),
            CrossoverStrategy::Adaptive,
        )
        .unwrap_err();
    assert_eq!(err, BreedError::IncompatibleProfiles);
}

#[test]
fn breeding_leaves_parents_untouched() {
    let a = profile(DRUMS);
    let b = profile(KEYS);
    let (a_before, b_before) = (a.clone(), b.clone());

    BreedingEngine::default()
        .breed(&a, &b, CrossoverStrategy::Hybrid)
        .unwrap();

    assert_eq!(a, a_before);
    assert_eq!(b, b_before);
}
