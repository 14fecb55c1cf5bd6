use std::fmt;

/// Column vocabulary of a bestlist table. The header text is what the bestlist page prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BestlistColumn {
    Number,
    Athlete,
    Club,
    Event,
    Result,
    Wind,
    Rank,
    NotHomologated,
    Nationality,
    Birthdate,
    Location,
    Date,
    AthleteCode,
    ClubCode,
    EventCode,
}

impl BestlistColumn {
    pub const ALL: [BestlistColumn; 15] = [
        BestlistColumn::Number,
        BestlistColumn::Athlete,
        BestlistColumn::Club,
        BestlistColumn::Event,
        BestlistColumn::Result,
        BestlistColumn::Wind,
        BestlistColumn::Rank,
        BestlistColumn::NotHomologated,
        BestlistColumn::Nationality,
        BestlistColumn::Birthdate,
        BestlistColumn::Location,
        BestlistColumn::Date,
        BestlistColumn::AthleteCode,
        BestlistColumn::ClubCode,
        BestlistColumn::EventCode,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            BestlistColumn::Number => "Nr",
            BestlistColumn::Athlete => "Name",
            BestlistColumn::Club => "Verein",
            BestlistColumn::Event => "Wettkampf",
            BestlistColumn::Result => "Resultat",
            BestlistColumn::Wind => "Wind",
            BestlistColumn::Rank => "Rang",
            BestlistColumn::NotHomologated => "NH*",
            BestlistColumn::Nationality => "Nat.",
            BestlistColumn::Birthdate => "Geb. Dat.",
            BestlistColumn::Location => "Ort",
            BestlistColumn::Date => "Datum",
            BestlistColumn::AthleteCode => "athlete_code",
            BestlistColumn::ClubCode => "club_code",
            BestlistColumn::EventCode => "event_code",
        }
    }

    pub fn from_header(header: &str) -> Option<Self> {
        // junior lists label the club column differently
        if header == "Verein / Schule / Ort" {
            return Some(BestlistColumn::Club);
        }
        Self::ALL.into_iter().find(|column| column.header() == header)
    }
}

impl fmt::Display for BestlistColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.header())
    }
}
