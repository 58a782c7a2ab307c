//! Common types used across the platform

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kinds of field operations carried out on a plantation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum TypeOperation {
    Abattage,
    Defrichage,
    Piquetage,
    Plantation,
    Entretien,
    Recolte,
}

impl TypeOperation {
    /// Wire/database code
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeOperation::Abattage => "ABATTAGE",
            TypeOperation::Defrichage => "DEFRICHAGE",
            TypeOperation::Piquetage => "PIQUETAGE",
            TypeOperation::Plantation => "PLANTATION",
            TypeOperation::Entretien => "ENTRETIEN",
            TypeOperation::Recolte => "RECOLTE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ABATTAGE" => Some(TypeOperation::Abattage),
            "DEFRICHAGE" => Some(TypeOperation::Defrichage),
            "PIQUETAGE" => Some(TypeOperation::Piquetage),
            "PLANTATION" => Some(TypeOperation::Plantation),
            "ENTRETIEN" => Some(TypeOperation::Entretien),
            "RECOLTE" => Some(TypeOperation::Recolte),
            _ => None,
        }
    }

    /// Human-readable French label
    pub fn label(&self) -> &'static str {
        match self {
            TypeOperation::Abattage => "Abattage",
            TypeOperation::Defrichage => "Défrichage",
            TypeOperation::Piquetage => "Piquetage",
            TypeOperation::Plantation => "Plantation",
            TypeOperation::Entretien => "Entretien",
            TypeOperation::Recolte => "Récolte",
        }
    }
}

impl fmt::Display for TypeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Direction of a cash movement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum TypeMouvement {
    Entree,
    Sortie,
}

impl TypeMouvement {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeMouvement::Entree => "ENTREE",
            TypeMouvement::Sortie => "SORTIE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ENTREE" => Some(TypeMouvement::Entree),
            "SORTIE" => Some(TypeMouvement::Sortie),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TypeMouvement::Entree => "Entrée",
            TypeMouvement::Sortie => "Sortie",
        }
    }
}

impl fmt::Display for TypeMouvement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Optional inclusive date range for ledger queries
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Periode {
    pub date_debut: Option<chrono::NaiveDate>,
    pub date_fin: Option<chrono::NaiveDate>,
}

/// Quality grade of a harvest, from best (A) to worst (D)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum Qualite {
    A,
    B,
    C,
    D,
}

impl Qualite {
    pub fn as_str(&self) -> &'static str {
        match self {
            Qualite::A => "A",
            Qualite::B => "B",
            Qualite::C => "C",
            Qualite::D => "D",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "A" => Some(Qualite::A),
            "B" => Some(Qualite::B),
            "C" => Some(Qualite::C),
            "D" => Some(Qualite::D),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Qualite::A => "Excellente",
            Qualite::B => "Bonne",
            Qualite::C => "Moyenne",
            Qualite::D => "Faible",
        }
    }
}

impl fmt::Display for Qualite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_operation_codes_round_trip() {
        for op in [
            TypeOperation::Abattage,
            TypeOperation::Defrichage,
            TypeOperation::Piquetage,
            TypeOperation::Plantation,
            TypeOperation::Entretien,
            TypeOperation::Recolte,
        ] {
            assert_eq!(TypeOperation::from_str(op.as_str()), Some(op));
        }
        assert_eq!(TypeOperation::from_str("LABOUR"), None);
    }

    #[test]
    fn test_type_mouvement_codes() {
        assert_eq!(TypeMouvement::Entree.as_str(), "ENTREE");
        assert_eq!(TypeMouvement::Sortie.as_str(), "SORTIE");
        assert_eq!(TypeMouvement::from_str("ENTREE"), Some(TypeMouvement::Entree));
        assert_eq!(TypeMouvement::from_str("entree"), None);
    }

    #[test]
    fn test_qualite_labels() {
        assert_eq!(Qualite::A.label(), "Excellente");
        assert_eq!(Qualite::D.label(), "Faible");
        assert_eq!(Qualite::from_str("B"), Some(Qualite::B));
        assert_eq!(Qualite::from_str("E"), None);
    }
}
