/// Shared data structures for the application state
///
/// These structs represent the star records that flow between
/// the database layer and the viewport.
use std::collections::HashMap;

/// A single star read from the catalog database
///
/// Physical attributes use solar units (radius, mass, luminosity) and Kelvin
/// (temp). Positions are light-years from the sector origin. For members of a
/// multi-star system the `system_*` fields describe the shared container;
/// for single stars they duplicate the star's own values.
#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    /// Unique database ID
    pub id: i64,
    /// Display name (e.g., "Sol", "Alpha A")
    pub name: String,
    /// Raw spectral type string (e.g., "G2V")
    pub spectral: String,
    pub radius: f64,
    pub mass: f64,
    pub luminosity: f64,
    pub temp: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Name of the containing multi-star system (None for single stars)
    pub system_name: Option<String>,
    pub system_x: f64,
    pub system_y: f64,
    pub system_z: f64,
}

impl Star {
    /// Spectral class letter: first character when alphabetic, uppercased.
    /// Defaults to 'M' for empty strings or strings starting with a non-letter.
    pub fn spectral_class(&self) -> char {
        self.spectral
            .chars()
            .next()
            .filter(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('M')
    }

    /// Spectral subclass digit: second character when numeric, default 5.
    /// "G2V" gives 2, "GV" and "G" both give 5.
    pub fn spectral_subclass(&self) -> u32 {
        self.spectral
            .chars()
            .nth(1)
            .and_then(|c| c.to_digit(10))
            .unwrap_or(5)
    }

    /// Luminosity class: substring from the first 'V' in the spectral type.
    /// "G2V" gives "V", "K4VI" gives "VI". Defaults to "V" (main sequence).
    pub fn luminosity_class(&self) -> &str {
        self.spectral
            .find('V')
            .map(|i| &self.spectral[i..])
            .unwrap_or("V")
    }

    /// True iff this star is a component of a multi-star system
    pub fn is_multi_star(&self) -> bool {
        self.system_name.as_deref().is_some_and(|name| !name.is_empty())
    }

    /// Euclidean distance from the sector origin in light-years
    pub fn distance_from_origin(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Name to show next to the rendered point: the container name for
    /// multi-star representatives, the star's own name otherwise
    pub fn display_name(&self) -> &str {
        match self.system_name.as_deref() {
            Some(system) if !system.is_empty() => system,
            _ => &self.name,
        }
    }
}

/// Everything one database load produces
///
/// Built in a background task, then handed to the UI thread in one piece.
/// Loading a new database replaces the whole catalog; nothing is patched
/// incrementally.
#[derive(Debug, Clone, Default)]
pub struct StarCatalog {
    /// All stars, single stars first, ordered by name within each group
    pub stars: Vec<Star>,
    /// One representative (largest) star per multi-star system
    pub largest: HashMap<String, Star>,
    /// Total star count as reported by the aggregate query
    pub star_count: i64,
    /// Sector name from the optional metadata table ("" if absent)
    pub sector_name: String,
}

impl StarCatalog {
    /// Build the list of points the viewport actually draws: every single
    /// star, plus exactly one representative per multi-star system so the
    /// overlapping components collapse into one labelled point.
    pub fn display_list(&self) -> Vec<Star> {
        let mut list: Vec<Star> = self
            .stars
            .iter()
            .filter(|star| !star.is_multi_star())
            .cloned()
            .collect();

        let mut representatives: Vec<Star> = self.largest.values().cloned().collect();
        representatives.sort_by(|a, b| a.display_name().cmp(b.display_name()));
        list.extend(representatives);

        list
    }
}
