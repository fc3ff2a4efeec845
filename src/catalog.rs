use chrono::{DateTime, Utc};

use crate::models::{BaseTask, Periodicity, Task};
use crate::reducer::{create_task, TaskDraft};

/// Starter tasks given to every newly registered dog.
pub const BASE_TASKS: &[BaseTask] = &[
    BaseTask {
        key: "rabies_vaccine",
        title: "Rabies vaccine",
        note: "Annual booster. Keep the certificate with the pet passport.",
        periodicity: Periodicity::years(1),
        is_active: true,
    },
    BaseTask {
        key: "core_vaccine",
        title: "Core vaccines (DHPPi + L)",
        note: "Distemper, hepatitis, parvovirus, parainfluenza and leptospirosis.",
        periodicity: Periodicity::years(1),
        is_active: true,
    },
    BaseTask {
        key: "internal_deworming_oral",
        title: "Internal deworming",
        note: "Oral tablet dosed by weight.",
        periodicity: Periodicity::months(3),
        is_active: true,
    },
    BaseTask {
        key: "external_spot_on",
        title: "Flea and tick spot-on",
        note: "Apply between the shoulder blades; no bath for 48 hours.",
        periodicity: Periodicity::months(1),
        is_active: true,
    },
    BaseTask {
        key: "external_collar",
        title: "Antiparasitic collar",
        note: "Replace when the collar expires.",
        periodicity: Periodicity::months(8),
        is_active: false,
    },
    BaseTask {
        key: "heartworm_prevention",
        title: "Heartworm prevention",
        note: "Monthly chewable during mosquito season.",
        periodicity: Periodicity::months(1),
        is_active: true,
    },
    BaseTask {
        key: "annual_checkup",
        title: "Veterinary checkup",
        note: "General exam, weight and heart check.",
        periodicity: Periodicity::years(1),
        is_active: true,
    },
    BaseTask {
        key: "dental_cleaning",
        title: "Dental check",
        note: "Look for tartar and inflamed gums.",
        periodicity: Periodicity::months(6),
        is_active: true,
    },
    BaseTask {
        key: "weight_control",
        title: "Weight control",
        note: "",
        periodicity: Periodicity::months(1),
        is_active: true,
    },
    BaseTask {
        key: "grooming",
        title: "Grooming and nail trim",
        note: "",
        periodicity: Periodicity::weeks(6),
        is_active: true,
    },
    BaseTask {
        key: "senior_labs",
        title: "Senior blood work",
        note: "Recommended from seven years of age.",
        periodicity: Periodicity::years(1),
        is_active: false,
    },
];

/// Instantiates every catalog entry for a new dog, all scheduled from `now`.
///
/// `next_id` is called once per task and must return ids unique within the dog.
pub fn starter_tasks<F>(now: DateTime<Utc>, mut next_id: F) -> Vec<Task>
where
    F: FnMut() -> String,
{
    BASE_TASKS
        .iter()
        .map(|base| create_task(TaskDraft::from(base), next_id(), now))
        .collect()
}

/// Icon name for a task key.
pub fn task_icon(key: &str) -> &'static str {
    if key.contains("vaccine") {
        "syringe"
    } else if key == "external_collar" {
        "collar"
    } else if key == "external_spot_on" {
        "droplet"
    } else if key == "heartworm_prevention" {
        "heart-pulse"
    } else if key.contains("oral") || key.contains("deworming") {
        "pill"
    } else if key.contains("checkup") || key.contains("labs") {
        "stethoscope"
    } else if key.contains("dental") {
        "tooth"
    } else if key.contains("weight") {
        "scale"
    } else if key.contains("grooming") {
        "scissors"
    } else {
        "shield"
    }
}
