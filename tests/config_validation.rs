// Integration test for channel validation and lifecycle ordering

use decaymc::{ChannelArg, ChannelDefinition, DecayError, FastRng, Particle, SpinType, BUILTIN_MODELS};

fn n(v: f64) -> ChannelArg {
    ChannelArg::Number(v)
}

#[test]
fn test_malformed_channels_are_config_errors() {
    let cases = vec![
        // wrong arity
        ChannelDefinition::new("VPHOTOVISRHI", "vpho", &["J/psi", "gamma"], vec![n(1.0), n(1.0)]),
        ChannelDefinition::new("VSS", "phi", &["K+", "K-"], vec![n(0.0)]),
        ChannelDefinition::new("HELAMP", "phi", &["K+", "K-"], vec![n(1.0)]),
        ChannelDefinition::new("PHSP", "D0", &["K-", "pi+"], vec![n(1.0)]),
        // wrong daughter count
        ChannelDefinition::new("VPHOTOVISRHI", "vpho", &["J/psi"], vec![]),
        ChannelDefinition::new("VSS", "phi", &["K+", "K-", "pi0"], vec![]),
        ChannelDefinition::new("HELAMP", "B0", &["K+", "pi-", "pi0"], vec![]),
        ChannelDefinition::new("PHSP", "D0", &["K-"], vec![]),
        // wrong spins
        ChannelDefinition::new("VPHOTOVISRHI", "vpho", &["gamma", "J/psi"], vec![]),
        ChannelDefinition::new("VSS", "B0", &["K+", "pi-"], vec![]),
        ChannelDefinition::new("VSS", "J/psi", &["mu+", "mu-"], vec![]),
        // unknown particles
        ChannelDefinition::new("VSS", "phi", &["K+", "kaon"], vec![]),
        ChannelDefinition::new("PHSP", "Z'", &["e+", "e-"], vec![]),
        // non-numeric or non-finite arguments
        ChannelDefinition::new("VPHOTOVISRHI", "vpho", &["J/psi", "gamma"], vec![ChannelArg::from("one")]),
        ChannelDefinition::new("VPHOTOVISRHI", "vpho", &["J/psi", "gamma"], vec![n(f64::INFINITY)]),
        ChannelDefinition::new("HELAMP", "phi", &["K+", "K-"], vec![n(1.0), n(f64::NAN)]),
        // half-integer parent into integer-spin daughters
        ChannelDefinition::new("HELAMP", "p+", &["pi+", "pi-"], vec![n(1.0), n(0.0)]),
        // below threshold
        ChannelDefinition::new("PHSP", "phi", &["D0", "anti-D0"], vec![]),
        ChannelDefinition::new("VPHOTOVISRHI", "phi", &["J/psi", "gamma"], vec![]),
        // model name disagrees with the channel
        ChannelDefinition {
            model: "VSS".to_string(),
            parent: "vpho".to_string(),
            daughters: vec!["J/psi".to_string(), "gamma".to_string()],
            args: vec![],
        },
    ];

    for channel in cases {
        let mut model = match channel.model.as_str() {
            // exercise the mismatch case through a different model
            "VSS" if channel.parent == "vpho" => BUILTIN_MODELS.create("VPHOTOVISRHI").unwrap(),
            name => BUILTIN_MODELS.create(name).unwrap(),
        };
        let err = model.initialize(&channel).unwrap_err();
        assert!(
            matches!(err, DecayError::Config { .. }),
            "{:?} gave {:?}",
            channel,
            err
        );
        assert!(err.is_setup_failure());
        assert!(model.density_bound().is_none());
    }
}

#[test]
fn test_unknown_model_name() {
    let channel = ChannelDefinition::new("NOSUCHMODEL", "phi", &["K+", "K-"], vec![]);
    let mut rng = FastRng::new(1);
    assert!(matches!(
        BUILTIN_MODELS.build(&channel, &mut rng),
        Err(DecayError::UnknownModel(_))
    ));
}

#[test]
fn test_lifecycle_ordering() {
    let mut rng = FastRng::new(2);
    let channel = ChannelDefinition::new("VSS", "phi", &["K+", "K-"], vec![]);
    let parent = Particle::at_rest("phi", SpinType::Vector, 1.019461).into_ref();

    let mut model = BUILTIN_MODELS.create("VSS").unwrap();
    assert!(matches!(model.establish_bound(&mut rng), Err(DecayError::Lifecycle { .. })));
    assert!(matches!(model.sample(&parent, &mut rng), Err(DecayError::Lifecycle { .. })));

    model.initialize(&channel).unwrap();
    assert!(matches!(model.initialize(&channel), Err(DecayError::Lifecycle { .. })));
    assert!(matches!(model.sample(&parent, &mut rng), Err(DecayError::Lifecycle { .. })));

    let bound = model.establish_bound(&mut rng).unwrap();
    assert!(matches!(model.establish_bound(&mut rng), Err(DecayError::Lifecycle { .. })));
    assert_eq!(model.density_bound(), Some(bound));

    model.sample(&parent, &mut rng).unwrap();
    assert!(matches!(model.sample(&parent, &mut rng), Err(DecayError::Lifecycle { .. })));
}
