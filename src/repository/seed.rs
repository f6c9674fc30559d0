//! Listings shown in demo mode so the feed is never empty.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::models::{Job, JobType, Requirement};

struct Listing {
    title: &'static str,
    company: &'static str,
    workplace: &'static str,
    job_type: JobType,
    sector: &'static str,
    salary: &'static str,
    working_hours: &'static str,
    requirements: &'static [(&'static str, &'static str, &'static str)],
    description: &'static str,
    role_details: &'static str,
    open_days: i64,
    contact_email: &'static str,
    contact_phone: &'static str,
}

const LISTINGS: &[Listing] = &[
    Listing {
        title: "Junior Web Developer",
        company: "Khmer Digital Solutions",
        workplace: "Tuol Kork, Phnom Penh",
        job_type: JobType::FullTime,
        sector: "Technology",
        salary: "$500 - $800",
        working_hours: "8:30 AM - 5:30 PM (Mon-Fri)",
        requirements: &[
            ("CV / Resume", "To evaluate your professional background.", "PDF with at least two professional references."),
            ("Degree Transcript", "To verify your education.", "Scanned original copy in English or Khmer."),
            ("Portfolio Link", "To see actual examples of coding.", "Public GitHub profile or personal website."),
        ],
        description: "Build web apps for the Cambodian market with a small product team.",
        role_details: "• Develop responsive user interfaces.\n• Integrate frontend components with REST APIs.\n• Join daily stand-ups.",
        open_days: 26,
        contact_email: "hr@khmerdigital.com",
        contact_phone: "+855 23 456 789",
    },
    Listing {
        title: "Part-time Barista",
        company: "Brown Coffee",
        workplace: "BKK1, Phnom Penh",
        job_type: JobType::StudentFriendly,
        sector: "Hospitality",
        salary: "$150 - $250",
        working_hours: "Morning (6AM-11AM) or afternoon (1PM-6PM) shifts",
        requirements: &[
            ("Student ID", "To confirm flexible shift eligibility.", "Clear photo of a valid university ID card."),
            ("Health Certificate", "Required for food safety.", "Issued within the last 6 months by a recognized clinic."),
        ],
        description: "Shift work at a leading coffee chain, suited to university students.",
        role_details: "• Prepare beverages following brand recipes.\n• Operate espresso machines.\n• Serve customers.",
        open_days: 15,
        contact_email: "careers@browncoffee.com",
        contact_phone: "+855 12 345 678",
    },
    Listing {
        title: "English Language Teacher",
        company: "Phnom Penh International School",
        workplace: "Sen Sok, Phnom Penh",
        job_type: JobType::FullTime,
        sector: "Education",
        salary: "$1500 - $2200",
        working_hours: "7:30 AM - 4:30 PM",
        requirements: &[
            ("TEFL/CELTA Certificate", "Legal requirement for teaching.", "Certified copy from an accredited institution."),
            ("Background Check", "Child protection policy.", "Clear criminal record from home country or local police."),
        ],
        description: "Teach English as part of an international faculty.",
        role_details: "• Plan and deliver lessons.\n• Assess student progress.\n• Attend faculty meetings.",
        open_days: 40,
        contact_email: "hr@ppis.edu.kh",
        contact_phone: "+855 11 222 333",
    },
    Listing {
        title: "Social Media Manager",
        company: "Social Ace Agency",
        workplace: "BKK2, Phnom Penh",
        job_type: JobType::Freelance,
        sector: "Marketing",
        salary: "$30 - $50 / Day",
        working_hours: "Flexible / Project Based",
        requirements: &[
            ("Content Plan Example", "To see your strategic thinking.", "A one-week sample plan for a retail brand."),
            ("References", "To verify project reliability.", "Contact details of two previous clients."),
        ],
        description: "Run social accounts for growing local businesses.",
        role_details: "• Design daily posts.\n• Manage community engagement.\n• Report on campaign performance.",
        open_days: 30,
        contact_email: "hello@socialace.com",
        contact_phone: "+855 16 555 444",
    },
];

/// Demo listings owned by `employer_id`, newest first.
pub fn sample_jobs(employer_id: Uuid) -> Vec<Job> {
    let now = Utc::now();
    LISTINGS
        .iter()
        .enumerate()
        .map(|(idx, listing)| {
            let created_at = now - Duration::hours(idx as i64);
            Job {
                id: Uuid::new_v4(),
                employer_id,
                title: listing.title.to_string(),
                company: listing.company.to_string(),
                workplace: listing.workplace.to_string(),
                job_type: listing.job_type,
                sector: listing.sector.to_string(),
                salary: listing.salary.to_string(),
                working_hours: listing.working_hours.to_string(),
                requirements: listing
                    .requirements
                    .iter()
                    .map(|(name, why, instruction)| Requirement::new(name, why, Some(instruction)))
                    .collect(),
                description: listing.description.to_string(),
                role_details: listing.role_details.to_string(),
                posted_at: created_at,
                end_date: (created_at + Duration::days(listing.open_days)).date_naive(),
                contact_email: listing.contact_email.to_string(),
                contact_phone: Some(listing.contact_phone.to_string()),
                created_at,
                deleted_at: None,
            }
        })
        .collect()
}
