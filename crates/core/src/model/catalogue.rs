use crate::model::CategoryId;
use crate::model::question::Category;

/// Board-exam categories offered during onboarding, in display order.
const CATEGORIES: [(&str, &str); 15] = [
    (
        "Anatomy & Physiology",
        "Basic structure and function of human body systems",
    ),
    (
        "Clinical Medicine",
        "Fundamentals of clinical practice and patient care",
    ),
    (
        "Cardiology",
        "Diseases and conditions affecting the heart and blood vessels",
    ),
    (
        "Pulmonology",
        "Diseases and conditions affecting the respiratory system",
    ),
    (
        "Gastroenterology",
        "Diseases and conditions affecting the digestive system",
    ),
    (
        "Endocrinology",
        "Diseases and conditions affecting the endocrine system",
    ),
    ("Nephrology", "Diseases and conditions affecting the kidneys"),
    (
        "Neurology",
        "Diseases and conditions affecting the nervous system",
    ),
    ("Orthopedics", "Musculoskeletal conditions and injuries"),
    (
        "Infectious Disease",
        "Diseases caused by pathogenic microorganisms",
    ),
    ("Emergency Medicine", "Acute care and emergency conditions"),
    ("Pediatrics", "Care of infants, children, and adolescents"),
    ("OB/GYN", "Women's health and reproductive medicine"),
    ("Psychiatry", "Mental health conditions and disorders"),
    ("Dermatology", "Conditions affecting the skin"),
];

/// Returns the onboarding category list.
///
/// Ids are name slugs, except `OB/GYN` (`obgyn`) and
/// `Anatomy & Physiology` (`anatomy-physiology`).
#[must_use]
pub fn onboarding_categories() -> Vec<Category> {
    CATEGORIES
        .iter()
        .map(|(name, description)| match *name {
            "OB/GYN" => Category::from_persisted(
                CategoryId::new("obgyn"),
                *name,
                *description,
            ),
            "Anatomy & Physiology" => Category::from_persisted(
                CategoryId::new("anatomy-physiology"),
                *name,
                *description,
            ),
            _ => Category::new(*name, *description),
        })
        .collect()
}
