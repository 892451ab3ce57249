//! Built-in sample question bank used to seed empty databases.

use quiz_core::model::{
    Category, Difficulty, Question, QuestionDraft, QuestionError, QuestionId, Topic,
    onboarding_categories,
};

struct Sample {
    id: &'static str,
    prompt: &'static str,
    options: &'static [&'static str],
    correct: usize,
    explanation: &'static str,
    topic: &'static str,
    category: &'static str,
    difficulty: Difficulty,
    tags: &'static [&'static str],
}

const SAMPLES: &[Sample] = &[
    Sample {
        id: "1",
        prompt: "A 45-year-old man has crushing chest pain radiating to the left arm and jaw that began during exertion. What is the most likely diagnosis?",
        options: &[
            "Acute myocardial infarction",
            "Costochondritis",
            "Gastroesophageal reflux disease",
            "Pneumothorax",
            "Pulmonary embolism",
        ],
        correct: 0,
        explanation: "Exertional, crushing pain radiating to the arm and jaw is the classic presentation of acute coronary ischemia.",
        topic: "Cardiovascular",
        category: "Cardiology",
        difficulty: Difficulty::Medium,
        tags: &["emergency", "chest pain"],
    },
    Sample {
        id: "2",
        prompt: "A 28-year-old woman on oral contraceptives develops sudden dyspnea and pleuritic chest pain after a long flight. Her Wells score is low. What is the best initial test?",
        options: &["D-dimer", "Chest X-ray", "Electrocardiogram", "Troponin", "Echocardiogram"],
        correct: 0,
        explanation: "With low pretest probability for pulmonary embolism, a negative D-dimer effectively rules it out.",
        topic: "Pulmonary Vascular Disease",
        category: "Pulmonology",
        difficulty: Difficulty::Medium,
        tags: &["pulmonary embolism"],
    },
    Sample {
        id: "3",
        prompt: "Which laboratory finding is most characteristic of primary hypothyroidism?",
        options: &[
            "Elevated TSH with low free T4",
            "Low TSH with high free T4",
            "Low TSH with low free T4",
            "Normal TSH with high free T4",
        ],
        correct: 0,
        explanation: "Failure of the gland lowers T4, which removes negative feedback and raises TSH.",
        topic: "Thyroid Disorders",
        category: "Endocrinology",
        difficulty: Difficulty::Easy,
        tags: &["thyroid", "labs"],
    },
    Sample {
        id: "4",
        prompt: "A patient with long-standing hypertension has a sustained, laterally displaced apical impulse. What does this most likely indicate?",
        options: &[
            "Left ventricular hypertrophy with dilation",
            "Right ventricular hypertrophy",
            "Pericardial effusion",
            "Mitral stenosis",
        ],
        correct: 0,
        explanation: "A displaced, sustained point of maximal impulse reflects an enlarged left ventricle.",
        topic: "Heart Failure",
        category: "Cardiology",
        difficulty: Difficulty::Hard,
        tags: &["physical exam"],
    },
    Sample {
        id: "5",
        prompt: "Which organism most commonly causes community-acquired pneumonia in adults?",
        options: &[
            "Streptococcus pneumoniae",
            "Haemophilus influenzae",
            "Mycoplasma pneumoniae",
            "Staphylococcus aureus",
        ],
        correct: 0,
        explanation: "Pneumococcus remains the leading bacterial cause of community-acquired pneumonia.",
        topic: "Respiratory Infections",
        category: "Infectious Disease",
        difficulty: Difficulty::Easy,
        tags: &["pneumonia"],
    },
    Sample {
        id: "6",
        prompt: "A patient has epigastric pain that improves with meals and recurs two to three hours later. What is the most likely diagnosis?",
        options: &["Duodenal ulcer", "Gastric ulcer", "Cholecystitis", "Pancreatitis"],
        correct: 0,
        explanation: "Food buffers acid over a duodenal ulcer; pain returns as the stomach empties.",
        topic: "Peptic Ulcer Disease",
        category: "Gastroenterology",
        difficulty: Difficulty::Medium,
        tags: &["abdominal pain"],
    },
    Sample {
        id: "7",
        prompt: "Which is the first-line treatment for an acute migraine in an otherwise healthy adult with moderate to severe pain?",
        options: &["Sumatriptan", "Propranolol", "Topiramate", "Amitriptyline"],
        correct: 0,
        explanation: "Triptans abort attacks; the other drugs are prophylactic agents.",
        topic: "Headache",
        category: "Neurology",
        difficulty: Difficulty::Easy,
        tags: &["migraine", "pharmacology"],
    },
    Sample {
        id: "8",
        prompt: "A 70-year-old has sudden right arm weakness and expressive aphasia that began 90 minutes ago. CT shows no hemorrhage. What is the next step?",
        options: &[
            "Intravenous thrombolysis",
            "Start aspirin and observe",
            "Lumbar puncture",
            "Schedule outpatient MRI",
        ],
        correct: 0,
        explanation: "Within the treatment window and without hemorrhage, eligible ischemic stroke patients receive thrombolysis.",
        topic: "Cerebrovascular Disease",
        category: "Neurology",
        difficulty: Difficulty::Hard,
        tags: &["stroke", "emergency"],
    },
    Sample {
        id: "9",
        prompt: "Which electrolyte abnormality produces peaked T waves on ECG?",
        options: &["Hyperkalemia", "Hypokalemia", "Hypercalcemia", "Hyponatremia"],
        correct: 0,
        explanation: "Elevated potassium shortens repolarization, producing tall, peaked T waves.",
        topic: "Electrolytes",
        category: "Nephrology",
        difficulty: Difficulty::Easy,
        tags: &["ecg", "electrolytes"],
    },
    Sample {
        id: "10",
        prompt: "A child has a honey-colored crusted rash around the nose and mouth. What is the most likely diagnosis?",
        options: &["Impetigo", "Herpes simplex", "Contact dermatitis", "Tinea faciei"],
        correct: 0,
        explanation: "Honey-colored crusts are the hallmark of impetigo.",
        topic: "Skin Infections",
        category: "Dermatology",
        difficulty: Difficulty::Easy,
        tags: &["rash", "pediatrics"],
    },
    Sample {
        id: "11",
        prompt: "A toddler has a barking cough, inspiratory stridor and a steeple sign on neck radiograph. What is the diagnosis?",
        options: &["Croup", "Epiglottitis", "Bronchiolitis", "Foreign body aspiration"],
        correct: 0,
        explanation: "Subglottic narrowing from parainfluenza virus gives the steeple sign of croup.",
        topic: "Pediatric Airway",
        category: "Pediatrics",
        difficulty: Difficulty::Easy,
        tags: &["stridor"],
    },
    Sample {
        id: "12",
        prompt: "A pregnant woman at 32 weeks has painless bright red vaginal bleeding. Which step should be avoided until imaging is done?",
        options: &[
            "Digital cervical examination",
            "Transabdominal ultrasound",
            "Fetal heart monitoring",
            "Complete blood count",
        ],
        correct: 0,
        explanation: "Placenta previa must be excluded before any digital exam, which can provoke hemorrhage.",
        topic: "Obstetrics",
        category: "OB/GYN",
        difficulty: Difficulty::Hard,
        tags: &["bleeding", "pregnancy"],
    },
    Sample {
        id: "13",
        prompt: "Which medication is first-line for long-term treatment of generalized anxiety disorder?",
        options: &["Sertraline", "Alprazolam", "Haloperidol", "Lithium"],
        correct: 0,
        explanation: "SSRIs are first-line maintenance therapy; benzodiazepines are reserved for short-term use.",
        topic: "Anxiety Disorders",
        category: "Psychiatry",
        difficulty: Difficulty::Medium,
        tags: &["pharmacology"],
    },
    Sample {
        id: "14",
        prompt: "A fall on an outstretched hand causes anatomic snuffbox tenderness with a normal radiograph. What is the appropriate management?",
        options: &[
            "Thumb spica splint and repeat imaging",
            "Reassurance and no follow-up",
            "Immediate open reduction",
            "Compression wrap only",
        ],
        correct: 0,
        explanation: "Occult scaphoid fractures are common; immobilize and re-image to avoid avascular necrosis.",
        topic: "Hand and Wrist",
        category: "Orthopedics",
        difficulty: Difficulty::Medium,
        tags: &["fracture"],
    },
    Sample {
        id: "15",
        prompt: "A patient collapses while standing in line, recovers within a minute and has no post-event confusion. Which cause is most likely?",
        options: &["Vasovagal syncope", "Generalized seizure", "Hypoglycemia", "Stroke"],
        correct: 0,
        explanation: "Prolonged standing with rapid, complete recovery points to reflex syncope.",
        topic: "Syncope",
        category: "Emergency Medicine",
        difficulty: Difficulty::Medium,
        tags: &["syncope"],
    },
    Sample {
        id: "16",
        prompt: "Type 2 diabetes is diagnosed in an adult with normal renal function. What is the usual first-line medication?",
        options: &["Metformin", "Insulin glargine", "Glipizide", "Pioglitazone"],
        correct: 0,
        explanation: "Metformin is first-line absent contraindications.",
        topic: "Diabetes Mellitus",
        category: "Endocrinology",
        difficulty: Difficulty::Easy,
        tags: &["diabetes", "pharmacology"],
    },
];

/// Build the sample bank as validated questions, in a stable order.
///
/// # Errors
///
/// Returns `QuestionError` if a sample fails validation.
pub fn builtin_questions() -> Result<Vec<Question>, QuestionError> {
    let categories = onboarding_categories();

    SAMPLES
        .iter()
        .map(|sample| {
            let category = categories
                .iter()
                .find(|c| c.name() == sample.category)
                .cloned()
                .unwrap_or_else(|| Category::new(sample.category, ""));

            QuestionDraft {
                id: QuestionId::new(sample.id),
                prompt: sample.prompt.to_string(),
                options: sample.options.iter().map(|o| (*o).to_string()).collect(),
                correct_answer: sample.correct,
                explanation: sample.explanation.to_string(),
                topic: Topic::new(sample.topic, category),
                difficulty: sample.difficulty,
                tags: sample.tags.iter().map(|t| (*t).to_string()).collect(),
            }
            .validate()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn bank_validates_with_unique_ids() {
        let bank = builtin_questions().unwrap();
        assert_eq!(bank.len(), SAMPLES.len());

        let ids: HashSet<_> = bank.iter().map(|q| q.id().clone()).collect();
        assert_eq!(ids.len(), bank.len());
    }

    #[test]
    fn bank_categories_come_from_onboarding_list() {
        let known: HashSet<_> = onboarding_categories()
            .into_iter()
            .map(|c| c.id().clone())
            .collect();
        for question in builtin_questions().unwrap() {
            assert!(
                known.contains(question.category().id()),
                "{} has unknown category {}",
                question.id(),
                question.category().id()
            );
        }
    }

    #[test]
    fn bank_covers_every_difficulty() {
        let bank = builtin_questions().unwrap();
        for difficulty in Difficulty::ALL {
            assert!(bank.iter().any(|q| q.difficulty() == difficulty));
        }
    }
}
