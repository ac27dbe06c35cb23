//! Canonical accessors over the heterogeneous property bags found in the
//! cooperative dataset.
//!
//! The source files mix at least two schema generations: short column-style
//! keys (`NomCoop`, `nbr_femmes`) and long form-style keys
//! (`Nom de coopérative`, `Nombre des femmes`). Every lookup tries an ordered
//! alias list and takes the first present, non-empty value, so both
//! generations are supported without knowing which one a given feature uses.

use geojson::{Feature, JsonObject};
use serde::Serialize;
use serde_json::Value;

pub const NAME_KEYS: &[&str] = &["NomCoop", "nom", "Nom de coopérative", "NAME", "Name"];
pub const REPRESENTATIVE_KEYS: &[&str] = &["NomPrenom", "Nom et prénom président/gestionnaire"];
pub const GENDER_KEYS: &[&str] = &["Genre"];
pub const ACTIVITY_KEYS: &[&str] = &["activité", "Filière d'activité"];
pub const PROVINCE_KEYS: &[&str] = &["Province"];
pub const CERCLE_KEYS: &[&str] = &["Cercle"];
pub const COMMUNE_KEYS: &[&str] = &["Commune", "commune"];
pub const DOUAR_KEYS: &[&str] = &["Douar_Quar", "Douar/Quartier"];
pub const CREATION_DATE_KEYS: &[&str] = &["Date_creat", "Date de création"];
pub const EDUCATION_KEYS: &[&str] = &["Niveau sco", "Niveau scolaire"];
pub const PHONE_KEYS: &[&str] = &["Tel"];
pub const MEMBER_KEYS: &[&str] = &["nbr adhér", "Nombre des adhérents"];
pub const WOMEN_KEYS: &[&str] = &["nbr_femmes", "Nombre des femmes"];
pub const YOUTH_KEYS: &[&str] = &["nbr_jeunes", "Nombre des jeunes"];
pub const CAPITAL_KEYS: &[&str] = &["capitalsoc", "Capital social"];
pub const COORD_X_KEYS: &[&str] = &["X"];
pub const COORD_Y_KEYS: &[&str] = &["Y"];

/// Commune boundary features name their commune under yet another set of
/// spellings than the cooperative features do.
pub const BOUNDARY_NAME_KEYS: &[&str] = &["NAME", "Name", "nom"];

/// Displayed when a text field resolves to nothing.
pub const MISSING_FIELD: &str = "-";
/// Displayed when a cooperative has no resolvable name at all.
pub const UNNAMED_COOPERATIVE: &str = "Coopérative";

/// First present, non-empty, non-null string value among `keys`.
pub fn text<'a>(props: &'a JsonObject, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| match props.get(*key) {
        Some(Value::String(value)) if !value.trim().is_empty() => Some(value.as_str()),
        _ => None,
    })
}

/// Like [`text`], but renders numbers too and falls back to `"-"`.
pub fn display(props: &JsonObject, keys: &[&str]) -> String {
    for key in keys {
        match props.get(*key) {
            Some(Value::String(value)) if !value.trim().is_empty() => return value.clone(),
            Some(Value::Number(value)) => return value.to_string(),
            _ => {}
        }
    }
    MISSING_FIELD.to_string()
}

/// Non-negative count field. Accepts JSON numbers and numeric strings;
/// anything else counts as zero.
pub fn count(props: &JsonObject, keys: &[&str]) -> u64 {
    for key in keys {
        match props.get(*key) {
            Some(Value::Number(value)) => {
                if let Some(count) = value.as_u64() {
                    return count;
                }
                if let Some(count) = value.as_f64() {
                    return count.max(0.0) as u64;
                }
            }
            Some(Value::String(value)) => {
                if let Ok(count) = value.trim().parse::<u64>() {
                    return count;
                }
            }
            _ => {}
        }
    }
    0
}

/// Coordinate field kept as display text: numeric values are formatted to two
/// decimals, non-numeric text is passed through unchanged.
pub fn coordinate(props: &JsonObject, keys: &[&str]) -> String {
    for key in keys {
        match props.get(*key) {
            Some(Value::Number(value)) => {
                if let Some(coordinate) = value.as_f64() {
                    return format!("{coordinate:.2}");
                }
            }
            Some(Value::String(value)) if !value.trim().is_empty() => {
                return match value.trim().parse::<f64>() {
                    Ok(coordinate) => format!("{coordinate:.2}"),
                    Err(_) => value.clone(),
                };
            }
            _ => {}
        }
    }
    MISSING_FIELD.to_string()
}

pub fn boundary_name(props: &JsonObject) -> Option<&str> {
    text(props, BOUNDARY_NAME_KEYS)
}

/// Borrowing view over a cooperative's property bag.
#[derive(Debug, Clone, Copy)]
pub struct Cooperative<'a> {
    props: &'a JsonObject,
}

impl<'a> Cooperative<'a> {
    pub fn new(props: &'a JsonObject) -> Self {
        Self { props }
    }

    /// `None` when the feature has no property bag at all.
    pub fn from_feature(feature: &'a Feature) -> Option<Self> {
        feature.properties.as_ref().map(Self::new)
    }

    /// Canonical cooperative name; `None` means the feature cannot be
    /// searched or meaningfully displayed.
    pub fn name(&self) -> Option<&'a str> {
        text(self.props, NAME_KEYS)
    }

    pub fn display_name(&self) -> &'a str {
        self.name().unwrap_or(UNNAMED_COOPERATIVE)
    }

    pub fn commune(&self) -> Option<&'a str> {
        text(self.props, COMMUNE_KEYS)
    }

    pub fn representative(&self) -> Option<&'a str> {
        text(self.props, REPRESENTATIVE_KEYS)
    }

    /// Every canonical field resolved to its display form, for the detail
    /// popup and record inspection.
    pub fn details(&self) -> CooperativeDetails {
        CooperativeDetails {
            name: self.display_name().to_string(),
            representative: display(self.props, REPRESENTATIVE_KEYS),
            gender: display(self.props, GENDER_KEYS),
            activity: display(self.props, ACTIVITY_KEYS),
            province: display(self.props, PROVINCE_KEYS),
            cercle: display(self.props, CERCLE_KEYS),
            commune: display(self.props, COMMUNE_KEYS),
            douar: display(self.props, DOUAR_KEYS),
            creation_date: display(self.props, CREATION_DATE_KEYS),
            education: display(self.props, EDUCATION_KEYS),
            phone: display(self.props, PHONE_KEYS),
            members: count(self.props, MEMBER_KEYS),
            women: count(self.props, WOMEN_KEYS),
            youth: count(self.props, YOUTH_KEYS),
            capital: display(self.props, CAPITAL_KEYS),
            coordinate_x: coordinate(self.props, COORD_X_KEYS),
            coordinate_y: coordinate(self.props, COORD_Y_KEYS),
        }
    }
}

/// Resolved record, ready for display. All text fields default to `"-"`,
/// counts to zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CooperativeDetails {
    pub name: String,
    pub representative: String,
    pub gender: String,
    pub activity: String,
    pub province: String,
    pub cercle: String,
    pub commune: String,
    pub douar: String,
    pub creation_date: String,
    pub education: String,
    pub phone: String,
    pub members: u64,
    pub women: u64,
    pub youth: u64,
    pub capital: String,
    pub coordinate_x: String,
    pub coordinate_y: String,
}
