// tests/property_mode.rs

use proptest::prelude::*;
use sitepipe::config::{BuildConfig, PathTable};
use sitepipe::pipeline::script::{concat, BUNDLE_SEPARATOR};
use sitepipe::types::{AssetClass, Mode};

proptest! {
    #[test]
    fn only_exact_production_selects_production(raw in "\\PC{0,16}") {
        let mode = Mode::resolve(Some(&raw));
        if raw == "production" {
            prop_assert_eq!(mode, Mode::Production);
        } else {
            prop_assert_eq!(mode, Mode::Development);
        }
    }

    #[test]
    fn outputs_stay_inside_the_mode_root(production in any::<bool>()) {
        let mode = if production { Mode::Production } else { Mode::Development };
        let config = BuildConfig::new("/site", mode, PathTable::default());
        let expected_root = if production { "/site/public" } else { "/site/build" };

        for class in AssetClass::ALL {
            prop_assert!(config.output_dir(class).starts_with(expected_root));
        }
    }

    #[test]
    fn concat_preserves_part_order(parts in proptest::collection::vec("[a-z;() ]{0,12}", 0..8)) {
        let bundle = concat(&parts);

        // Each part appears at the position implied by its predecessors.
        let mut offset = 0;
        for (i, part) in parts.iter().enumerate() {
            prop_assert_eq!(&bundle[offset..offset + part.len()], part.as_str());
            offset += part.len();
            if i + 1 < parts.len() {
                prop_assert_eq!(&bundle[offset..offset + BUNDLE_SEPARATOR.len()], BUNDLE_SEPARATOR);
                offset += BUNDLE_SEPARATOR.len();
            }
        }
        prop_assert_eq!(offset, bundle.len());
    }
}
