use super::{
    ApiError, ApiResult, AuthResponse, LoginRequest, SignupRequest, Submission, SubmissionService,
    SubmissionStatus, SubmissionUpdate, User, VoteReceipt,
};
use crate::design::{FlavorNotes, FontStyle, MAX_FLAVOR_NOTES, Rgb, SubmissionPayload};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

pub const DEMO_EMAIL: &str = "explorer@lays.com";
pub const DEMO_PASSWORD: &str = "crunchtime";

struct Seed {
    id: &'static str,
    owner: &'static str,
    username: &'static str,
    name: &'static str,
    notes: &'static [&'static str],
    color: u32,
    font: FontStyle,
    votes: u32,
    status: SubmissionStatus,
    created_at: &'static str,
}

const SEEDS: [Seed; 7] = [
    Seed {
        id: "sub-001",
        owner: "user-001",
        username: "flavor_creator_1",
        name: "Smoky BBQ Delight",
        notes: &["Smoked Paprika", "BBQ", "Savory"],
        color: 0xDC4419,
        font: FontStyle::Bold,
        votes: 187,
        status: SubmissionStatus::Published,
        created_at: "2026-01-05",
    },
    Seed {
        id: "sub-002",
        owner: "user-002",
        username: "spice_master",
        name: "Lime & Cilantro Crunch",
        notes: &["Lime", "Cilantro", "Jalapeño"],
        color: 0x2FBF71,
        font: FontStyle::Modern,
        votes: 142,
        status: SubmissionStatus::Published,
        created_at: "2026-01-03",
    },
    Seed {
        id: "sub-003",
        owner: "user-003",
        username: "umami_fan",
        name: "Truffle & Garlic",
        notes: &["Truffle", "Garlic", "Umami"],
        color: 0x8B6914,
        font: FontStyle::Elegant,
        votes: 256,
        status: SubmissionStatus::Published,
        created_at: "2026-01-01",
    },
    Seed {
        id: "sub-004",
        owner: "user-004",
        username: "sweet_tooth",
        name: "Honey & Sriracha",
        notes: &["Honey", "Sriracha", "Chili"],
        color: 0xFFA500,
        font: FontStyle::Playful,
        votes: 203,
        status: SubmissionStatus::Published,
        created_at: "2025-12-30",
    },
    Seed {
        id: "sub-005",
        owner: "user-005",
        username: "dill_pickle_lover",
        name: "Classic Dill Pickle",
        notes: &["Dill", "Pickle", "Vinegar"],
        color: 0x009245,
        font: FontStyle::Retro,
        votes: 98,
        status: SubmissionStatus::Published,
        created_at: "2025-12-28",
    },
    Seed {
        id: "user-sub-001",
        owner: "user-123",
        username: "flavor_explorer",
        name: "My Wasabi Dream",
        notes: &["Wasabi", "Ginger"],
        color: 0x2FBF71,
        font: FontStyle::Modern,
        votes: 5,
        status: SubmissionStatus::Published,
        created_at: "2026-01-08",
    },
    Seed {
        id: "user-sub-002",
        owner: "user-123",
        username: "flavor_explorer",
        name: "Curry Craze",
        notes: &["Curry", "Turmeric", "Coconut"],
        color: 0xFFA500,
        font: FontStyle::Bold,
        votes: 0,
        status: SubmissionStatus::Draft,
        created_at: "2026-01-07",
    },
];

static SEEDED_SUBMISSIONS: Lazy<Vec<Submission>> = Lazy::new(|| {
    SEEDS
        .iter()
        .map(|seed| Submission {
            id: seed.id.to_string(),
            owner_id: seed.owner.to_string(),
            username: seed.username.to_string(),
            name: seed.name.to_string(),
            flavor_notes: seed.notes.iter().map(|note| note.to_string()).collect(),
            bag_color: Rgb::from_u32(seed.color),
            font_style: seed.font,
            votes: seed.votes,
            status: seed.status,
            created_at: Some(seed.created_at.to_string()),
        })
        .collect()
});

struct Account {
    user: User,
    password: String,
}

/// In-memory backend with the demo catalogue preloaded. One vote per user per
/// submission.
pub struct FixtureBackend {
    accounts: HashMap<String, Account>,
    tokens: HashMap<String, String>,
    submissions: Vec<Submission>,
    votes: HashSet<(String, String)>,
    next_id: u64,
}

impl FixtureBackend {
    pub fn new() -> Self {
        let mut backend = Self::empty();
        backend.submissions = SEEDED_SUBMISSIONS.clone();
        backend.accounts.insert(
            DEMO_EMAIL.to_string(),
            Account {
                user: User {
                    id: "user-123".to_string(),
                    username: "flavor_explorer".to_string(),
                    email: DEMO_EMAIL.to_string(),
                },
                password: DEMO_PASSWORD.to_string(),
            },
        );
        backend
    }

    pub fn empty() -> Self {
        Self {
            accounts: HashMap::new(),
            tokens: HashMap::new(),
            submissions: Vec::new(),
            votes: HashSet::new(),
            next_id: 0,
        }
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{:04}", self.next_id)
    }

    fn user_for(&self, token: &str) -> ApiResult<User> {
        let user_id = self.tokens.get(token).ok_or(ApiError::AuthRequired)?;
        self.accounts
            .values()
            .find(|account| &account.user.id == user_id)
            .map(|account| account.user.clone())
            .ok_or(ApiError::AuthRequired)
    }

    fn position(&self, submission_id: &str) -> ApiResult<usize> {
        self.submissions
            .iter()
            .position(|submission| submission.id == submission_id)
            .ok_or_else(|| ApiError::NotFound(format!("submission {submission_id}")))
    }

    fn owned_position(&self, user: &User, submission_id: &str) -> ApiResult<usize> {
        let index = self.position(submission_id)?;
        if self.submissions[index].owner_id != user.id {
            return Err(ApiError::from_status(
                403,
                "only the author can change a submission",
                submission_id,
            ));
        }
        Ok(index)
    }
}

impl Default for FixtureBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn check_notes(notes: &[String]) -> ApiResult<()> {
    FlavorNotes::try_from(notes.to_vec())
        .map(|_| ())
        .map_err(|err| ApiError::Rejected {
            status: 400,
            message: format!("{err} (max {MAX_FLAVOR_NOTES})"),
        })
}

impl SubmissionService for FixtureBackend {
    async fn login(&mut self, request: &LoginRequest) -> ApiResult<AuthResponse> {
        let user = match self.accounts.get(&request.email) {
            Some(account) if account.password == request.password => account.user.clone(),
            _ => return Err(ApiError::InvalidCredentials),
        };
        let token = self.next_id("fixture-token");
        self.tokens.insert(token.clone(), user.id.clone());
        log::debug!("[api] issued token for {}", user.username);
        Ok(AuthResponse { token, user })
    }

    async fn signup(&mut self, request: &SignupRequest) -> ApiResult<AuthResponse> {
        if self.accounts.contains_key(&request.email) {
            return Err(ApiError::Rejected {
                status: 400,
                message: format!("{} is already registered", request.email),
            });
        }
        let user = User {
            id: self.next_id("user"),
            username: request.username.clone(),
            email: request.email.clone(),
        };
        self.accounts.insert(
            request.email.clone(),
            Account {
                user,
                password: request.password.clone(),
            },
        );
        self.login(&LoginRequest {
            email: request.email.clone(),
            password: request.password.clone(),
        })
        .await
    }

    async fn submit_design(
        &mut self,
        token: &str,
        payload: &SubmissionPayload,
    ) -> ApiResult<String> {
        let user = self.user_for(token)?;
        check_notes(&payload.key_flavors)?;
        if payload.flavor_name.trim().is_empty() {
            return Err(ApiError::Rejected {
                status: 400,
                message: "flavor name is required".to_string(),
            });
        }

        let id = self.next_id("sub");
        self.submissions.push(Submission {
            id: id.clone(),
            owner_id: user.id,
            username: user.username,
            name: payload.flavor_name.clone(),
            flavor_notes: payload.key_flavors.clone(),
            bag_color: payload.bag_color,
            font_style: payload.font_choice,
            votes: 0,
            status: SubmissionStatus::Published,
            created_at: None,
        });
        log::info!("[api] accepted submission {id}");
        Ok(id)
    }

    async fn list_submissions(&self) -> ApiResult<Vec<Submission>> {
        Ok(self
            .submissions
            .iter()
            .filter(|submission| submission.status == SubmissionStatus::Published)
            .cloned()
            .collect())
    }

    async fn user_submissions(&self, token: &str, user_id: &str) -> ApiResult<Vec<Submission>> {
        self.user_for(token)?;
        Ok(self
            .submissions
            .iter()
            .filter(|submission| submission.owner_id == user_id)
            .cloned()
            .collect())
    }

    async fn vote(&mut self, token: &str, submission_id: &str) -> ApiResult<VoteReceipt> {
        let user = self.user_for(token)?;
        let index = self.position(submission_id)?;
        if !self
            .votes
            .insert((user.id.clone(), submission_id.to_string()))
        {
            log::debug!("[api] {} already voted for {submission_id}", user.username);
            return Err(ApiError::Conflict {
                submission_id: submission_id.to_string(),
            });
        }

        let submission = &mut self.submissions[index];
        submission.votes += 1;
        Ok(VoteReceipt {
            votes: submission.votes,
        })
    }

    async fn update_submission(
        &mut self,
        token: &str,
        submission_id: &str,
        update: &SubmissionUpdate,
    ) -> ApiResult<Submission> {
        let user = self.user_for(token)?;
        let index = self.owned_position(&user, submission_id)?;
        if let Some(notes) = &update.key_flavors {
            check_notes(notes)?;
        }

        let submission = &mut self.submissions[index];
        if let Some(name) = &update.flavor_name {
            submission.name = name.clone();
        }
        if let Some(color) = update.bag_color {
            submission.bag_color = color;
        }
        if let Some(font) = update.font_choice {
            submission.font_style = font;
        }
        if let Some(notes) = &update.key_flavors {
            submission.flavor_notes = notes.clone();
        }
        if let Some(status) = update.status {
            submission.status = status;
        }
        Ok(submission.clone())
    }

    async fn delete_submission(&mut self, token: &str, submission_id: &str) -> ApiResult<()> {
        let user = self.user_for(token)?;
        let index = self.owned_position(&user, submission_id)?;
        self.submissions.remove(index);
        self.votes.retain(|(_, voted)| voted != submission_id);
        log::info!("[api] deleted submission {submission_id}");
        Ok(())
    }
}
