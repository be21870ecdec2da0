use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Apprentice,
    Company,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Apprentice => "APPRENTICE",
            UserRole::Company => "COMPANY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProtocolStatus {
    Received,
    Analyzing,
    Concluded,
}

// The stored value doubles as the display label, in Portuguese.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManifestType {
    #[serde(rename = "RECLAMAÇÃO")]
    Complaint,
    #[serde(rename = "DÚVIDA")]
    Doubt,
    #[serde(rename = "ELOGIO")]
    Praise,
}

impl ManifestType {
    pub const ALL: [ManifestType; 3] =
        [ManifestType::Complaint, ManifestType::Doubt, ManifestType::Praise];

    pub fn as_str(self) -> &'static str {
        match self {
            ManifestType::Complaint => "RECLAMAÇÃO",
            ManifestType::Doubt => "DÚVIDA",
            ManifestType::Praise => "ELOGIO",
        }
    }
}

pub const MANIFEST_REASONS: [&str; 6] = [
    "Ambiente de Trabalho",
    "Carga Horária / Horários",
    "Desvio de Função",
    "Relacionamento Equipe",
    "Remuneração / Benefícios",
    "Outros",
];

// Row in the `users` table, minus the password column: logins deserialize
// straight into this, so the credential never lingers in memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub identifier: String, // enrollment number (apprentice) or CNPJ (company)
    pub role: UserRole,
    pub avatar_url: Option<String>, // data URI
    pub company_id: Option<String>,
}

// Registration payload. Absent references must serialize as explicit JSON
// nulls, which the plain derive already does for None.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub name: String,
    pub identifier: String,
    pub password: String,
    pub role: UserRole,
    pub avatar_url: Option<String>,
    pub company_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanySummary {
    pub id: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

// The `protocols` table uses camelCase column names, unlike `users`. The
// store was provisioned that way; both spellings are load-bearing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Protocol {
    pub id: String, // client-generated, "PJA-" + 6 digits
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "targetCompanyId")]
    pub target_company_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: ManifestType,
    pub reason: String,
    pub description: String,
    #[serde(rename = "aiRefinement")]
    pub ai_refinement: Option<String>,
    #[serde(rename = "legalAnalysis")]
    pub legal_analysis: Option<String>,
    pub status: ProtocolStatus,
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

// What the form hands over; id, status and createdAt are filled in by the
// store client on insert.
#[derive(Debug, Clone)]
pub struct NewProtocol {
    pub user_id: String,
    pub target_company_id: Option<String>,
    pub kind: ManifestType,
    pub reason: String,
    pub description: String,
    pub ai_refinement: Option<String>,
    pub legal_analysis: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CompanyStats {
    pub praises: Vec<Protocol>,
    pub apprentice_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysis {
    pub refined_text: String,
    pub legal_analysis: String,
}
