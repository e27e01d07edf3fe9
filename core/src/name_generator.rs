//! Deterministic customer names for synthetic datasets.
//!
//! Produces either a plain display name or the raw CSV row form that
//! bulk uploads leave in the name column (`id,last,first,city`).

use crate::rng::StreamRng;

pub struct NameGenerator;

impl NameGenerator {
    pub fn first_name(rng: &mut StreamRng) -> &'static str {
        *rng.pick(FIRST_NAMES)
    }

    pub fn last_name(rng: &mut StreamRng) -> &'static str {
        *rng.pick(LAST_NAMES)
    }

    pub fn full_name(rng: &mut StreamRng) -> String {
        let first = Self::first_name(rng);
        let last = Self::last_name(rng);
        format!("{first} {last}")
    }

    /// Raw upload row: `customer_id,last,first,city`.
    pub fn csv_row(rng: &mut StreamRng, customer_id: &str) -> String {
        let first = Self::first_name(rng);
        let last = Self::last_name(rng);
        let city = rng.pick(CITIES);
        format!("{customer_id},{last},{first},{city}")
    }
}

const FIRST_NAMES: &[&str] = &[
    "Marco", "Giulia", "Luca", "Francesca", "Alessandro", "Chiara", "Matteo", "Sara",
    "Lorenzo", "Martina", "Andrea", "Elena", "Davide", "Valentina", "Simone", "Federica",
    "Paolo", "Silvia", "Stefano", "Laura", "Giorgio", "Anna", "Riccardo", "Beatrice",
    "Emma", "Noah", "Olivia", "Liam", "Sofia", "Lucas", "Clara", "Hugo",
];

const LAST_NAMES: &[&str] = &[
    "Rossi", "Russo", "Ferrari", "Esposito", "Bianchi", "Romano", "Colombo", "Ricci",
    "Marino", "Greco", "Bruno", "Gallo", "Conti", "De Luca", "Mancini", "Costa",
    "Giordano", "Rizzo", "Lombardi", "Moretti", "Barbieri", "Fontana", "Santoro", "Mariani",
    "Smith", "Muller", "Dubois", "Garcia", "Novak", "Jansen", "Berg", "Keller",
];

const CITIES: &[&str] = &[
    "Milano", "Roma", "Torino", "Napoli", "Bologna", "Firenze", "Genova", "Verona",
];
