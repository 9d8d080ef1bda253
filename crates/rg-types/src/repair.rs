//! Repair rules for historically mis-encoded registry text.
//!
//! The source files were decoded badly at some point in their life: every
//! accented character (the `é` of `Féminin`, of `Indéterminé`, of most
//! first names) shows up as the U+FFFD replacement glyph. The repair is a
//! two-step literal substitution, kept bug-compatible with the published
//! dashboard rather than attempting a proper re-decode:
//!
//! 1. at load time every replacement glyph becomes `_` ([`mask_glyphs`]);
//! 2. at display time `_` is restored to a plain `e` ([`restore_text`]),
//!    and the two known gender labels get their exact accented spelling
//!    back ([`canonical_gender`]).
//!
//! All call sites go through these three functions, so the substitution can
//! be swapped out in one place.

/// Replacement glyph produced by the bad historical decode.
pub const REPLACEMENT_GLYPH: char = '\u{FFFD}';

/// ASCII stand-in written into loaded tables for every replacement glyph.
pub const MASK_CHAR: char = '_';

/// Primary gender category for men, as stored.
pub const MASCULIN: &str = "Masculin";
/// Primary gender category for women, display spelling.
pub const FEMININ: &str = "Féminin";
/// `Féminin` as it actually appears in the loaded data.
pub const FEMININ_RAW: &str = "F_minin";
/// `Indéterminé` as it actually appears in the loaded data.
pub const INDETERMINE_RAW: &str = "Ind_termin_";
/// `Indéterminé`, display spelling.
pub const INDETERMINE: &str = "Indéterminé";

/// Load-time repair: rewrite every replacement glyph to [`MASK_CHAR`].
#[must_use]
pub fn mask_glyphs(text: &str) -> String {
    text.replace(REPLACEMENT_GLYPH, "_")
}

/// Display-time repair for free text (first names): restore the masked
/// character to `e`. `"H_l_ne"` becomes `"Helene"`; the accents are gone
/// for good, only intelligibility is recovered.
#[must_use]
pub fn restore_text(text: &str) -> String {
    text.replace(MASK_CHAR, "e")
}

/// Display-time repair for gender labels: the two corrupted categories get
/// their exact accented spelling back, everything else passes through.
#[must_use]
pub fn canonical_gender(raw: &str) -> String {
    match raw {
        FEMININ_RAW => FEMININ.to_owned(),
        INDETERMINE_RAW => INDETERMINE.to_owned(),
        other => other.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::{canonical_gender, mask_glyphs, restore_text};

    #[test]
    fn mask_rewrites_every_replacement_glyph() {
        assert_eq!(mask_glyphs("F\u{FFFD}minin"), "F_minin");
        assert_eq!(mask_glyphs("Jos\u{FFFD}phine \u{FFFD}"), "Jos_phine _");
        assert_eq!(mask_glyphs("Marie"), "Marie");
    }

    #[test]
    fn restore_turns_masks_back_into_e() {
        assert_eq!(restore_text("H_l_ne"), "Helene");
        assert_eq!(restore_text("Jean"), "Jean");
    }

    #[test]
    fn gender_labels_recover_their_accents() {
        assert_eq!(canonical_gender("F_minin"), "Féminin");
        assert_eq!(canonical_gender("Ind_termin_"), "Indéterminé");
        assert_eq!(canonical_gender("Masculin"), "Masculin");
    }
}
