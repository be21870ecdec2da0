use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use tracing::warn;

use crate::ai::Refiner;
use crate::models::{
    AiAnalysis, CompanyStats, CompanySummary, ManifestType, NewProtocol, NewUser, UserRole,
    MANIFEST_REASONS,
};
use crate::models::{Protocol, User};
use crate::store::RowStore;

pub const TOAST_LIFETIME: Duration = Duration::from_secs(5);
pub const MAX_AVATAR_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Register,
    Dashboard,
    NewManifest,
    History,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    shown_at: Instant,
}

impl Toast {
    fn new(message: &str, kind: ToastKind) -> Self {
        Self {
            message: message.to_string(),
            kind,
            shown_at: Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.shown_at.elapsed() >= TOAST_LIFETIME
    }
}

// --- Form buffers ---

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub name: String,
    pub identifier: String,
    pub password: String,
    pub confirm_password: String,
    pub company_id: Option<String>,
    pub avatar_path: String,          // file path being typed
    pub avatar_data: Option<String>,  // loaded data URI
}

#[derive(Debug, Clone)]
pub struct ManifestForm {
    pub kind: ManifestType,
    pub reason_index: usize,
    pub description: String,
    pub analysis: Option<AiAnalysis>,
}

impl Default for ManifestForm {
    fn default() -> Self {
        Self {
            kind: ManifestType::Complaint,
            reason_index: 0, // "Ambiente de Trabalho"
            description: String::new(),
            analysis: None,
        }
    }
}

impl ManifestForm {
    pub fn reason(&self) -> &'static str {
        MANIFEST_REASONS[self.reason_index]
    }
}

// --- Flow controller ---

pub struct App {
    store: Box<dyn RowStore>,
    refiner: Box<dyn Refiner>,
    pub view: View,
    pub role: UserRole, // pre-auth selector for both forms
    pub user: Option<User>,
    pub companies: Vec<CompanySummary>,
    pub protocols: Vec<Protocol>,
    pub stats: CompanyStats,
    pub login_form: LoginForm,
    pub register_form: RegisterForm,
    pub manifest_form: ManifestForm,
    pub toast: Option<Toast>,
    pub loading: bool,
    pub focus: usize,
    pub scroll: u16,
    pub should_quit: bool,
}

impl App {
    pub fn new(store: Box<dyn RowStore>, refiner: Box<dyn Refiner>) -> Self {
        Self {
            store,
            refiner,
            view: View::Login,
            role: UserRole::Apprentice,
            user: None,
            companies: Vec::new(),
            protocols: Vec::new(),
            stats: CompanyStats::default(),
            login_form: LoginForm::default(),
            register_form: RegisterForm::default(),
            manifest_form: ManifestForm::default(),
            toast: None,
            loading: false,
            focus: 0,
            scroll: 0,
            should_quit: false,
        }
    }

    pub fn user_role(&self) -> Option<UserRole> {
        self.user.as_ref().map(|u| u.role)
    }

    // --- Toast ---

    pub fn show_success(&mut self, message: &str) {
        self.toast = Some(Toast::new(message, ToastKind::Success));
    }

    pub fn show_error(&mut self, message: &str) {
        self.toast = Some(Toast::new(message, ToastKind::Error));
    }

    pub fn dismiss_toast(&mut self) {
        self.toast = None;
    }

    // Called on every poll tick so stale toasts disappear on their own.
    pub fn tick(&mut self) {
        if self.toast.as_ref().is_some_and(|t| t.is_expired()) {
            self.toast = None;
        }
    }

    // --- View transitions ---

    pub fn open_login(&mut self) {
        self.view = View::Login;
        self.clear_forms();
        self.focus = 0;
    }

    pub fn open_register(&mut self) {
        self.view = View::Register;
        self.clear_forms();
        self.focus = 0;
    }

    pub fn open_dashboard(&mut self) {
        if self.user.is_none() {
            return;
        }
        self.view = View::Dashboard;
        self.focus = 0;
        self.scroll = 0;
    }

    pub fn open_new_manifest(&mut self) {
        if self.user_role() != Some(UserRole::Apprentice) {
            return;
        }
        self.manifest_form = ManifestForm::default();
        self.view = View::NewManifest;
        self.focus = 0;
        self.scroll = 0;
    }

    pub fn open_history(&mut self) {
        if self.user_role() != Some(UserRole::Apprentice) {
            return;
        }
        self.view = View::History;
        self.scroll = 0;
    }

    pub fn sign_out(&mut self) {
        self.user = None;
        self.view = View::Login;
        self.role = UserRole::Apprentice;
        self.clear_forms();
        self.manifest_form = ManifestForm::default();
        self.protocols.clear();
        self.stats = CompanyStats::default();
        self.focus = 0;
        self.scroll = 0;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn toggle_role(&mut self) {
        let next = match self.role {
            UserRole::Apprentice => UserRole::Company,
            UserRole::Company => UserRole::Apprentice,
        };
        self.switch_role(next);
    }

    // Switching the form's role clears every buffered input, so nothing
    // typed for one role leaks into the other.
    pub fn switch_role(&mut self, role: UserRole) {
        self.role = role;
        self.clear_forms();
        self.focus = 0;
    }

    fn clear_forms(&mut self) {
        self.login_form = LoginForm::default();
        self.register_form = RegisterForm::default();
    }

    // --- Data refresh ---

    // Best effort: the picklist staying empty is not worth interrupting the
    // user over, so failures only reach the log.
    pub fn refresh_companies(&mut self) {
        match self.store.companies() {
            Ok(companies) => self.companies = companies,
            Err(err) => warn!(error = %err, "could not load company list"),
        }
    }

    pub fn refresh_dashboard(&mut self) {
        if self.loading {
            return;
        }
        self.loading = true;
        self.load_dashboard_data();
        self.loading = false;
    }

    fn load_dashboard_data(&mut self) {
        let Some(user) = self.user.clone() else {
            return;
        };
        match user.role {
            UserRole::Company => match self.store.company_stats(&user.id) {
                Ok(stats) => self.stats = stats,
                Err(err) => self.show_error(&err.to_string()),
            },
            UserRole::Apprentice => match self.store.protocols_for(&user.id) {
                Ok(protocols) => self.protocols = protocols,
                Err(err) => self.show_error(&err.to_string()),
            },
        }
    }

    // --- Login ---

    pub fn submit_login(&mut self) {
        if self.loading {
            return;
        }
        if self.login_form.identifier.is_empty() || self.login_form.password.is_empty() {
            self.show_error("Preencha todos os campos.");
            return;
        }
        self.loading = true;
        let result = self.store.login(
            &self.login_form.identifier,
            &self.login_form.password,
            self.role,
        );
        match result {
            Ok(Some(user)) => {
                self.show_success(&format!("Bem-vindo, {}!", user.name));
                self.user = Some(user);
                self.view = View::Dashboard;
                self.focus = 0;
                self.load_dashboard_data();
            }
            Ok(None) => self.show_error("Credenciais inválidas. Verifique os dados."),
            Err(err) => self.show_error(&err.to_string()),
        }
        self.loading = false;
    }

    // --- Registration ---

    fn validate_registration(&self) -> Option<&'static str> {
        let form = &self.register_form;
        if form.name.is_empty()
            || form.identifier.is_empty()
            || form.password.is_empty()
            || form.confirm_password.is_empty()
        {
            return Some("Preencha todos os campos obrigatórios.");
        }
        if form.password != form.confirm_password {
            return Some("As senhas não coincidem.");
        }
        if form.password.chars().count() < 6 {
            return Some("A senha deve ter pelo menos 6 caracteres.");
        }
        if self.role == UserRole::Apprentice {
            if form.company_id.is_none() {
                return Some("Selecione sua empresa de vínculo.");
            }
            if !is_valid_enrollment(&form.identifier) {
                return Some("A matrícula deve conter apenas números.");
            }
        }
        if self.role == UserRole::Company && form.avatar_data.is_none() {
            return Some("Envie uma imagem de identificação da empresa.");
        }
        None
    }

    pub fn submit_registration(&mut self) {
        if self.loading {
            return;
        }
        if let Some(message) = self.validate_registration() {
            self.show_error(message);
            return;
        }
        self.loading = true;
        let form = &self.register_form;
        let payload = NewUser {
            name: form.name.clone(),
            identifier: form.identifier.clone(),
            password: form.password.clone(),
            role: self.role,
            avatar_url: form.avatar_data.clone(),
            company_id: form.company_id.clone(),
        };
        match self.store.register(&payload) {
            Ok(_) => {
                self.show_success("Cadastro realizado com sucesso! Faça seu login.");
                self.view = View::Login;
                self.focus = 0;
                // Leave the fresh credentials ready for the login screen.
                self.login_form = LoginForm {
                    identifier: payload.identifier.clone(),
                    password: payload.password.clone(),
                };
                self.register_form = RegisterForm::default();
                if self.role == UserRole::Company {
                    self.refresh_companies();
                }
            }
            Err(err) => self.show_error(&err.to_string()),
        }
        self.loading = false;
    }

    // Loads the image at the typed path and inlines it as a data URI.
    pub fn load_avatar(&mut self) {
        let path_text = self.register_form.avatar_path.trim().to_string();
        if path_text.is_empty() {
            self.show_error("Informe o caminho da imagem.");
            return;
        }
        match read_avatar_file(Path::new(&path_text)) {
            Ok(data_uri) => {
                self.register_form.avatar_data = Some(data_uri);
                self.show_success("Imagem carregada.");
            }
            Err(err) => {
                warn!(error = ?err, "avatar load failed");
                self.show_error(&err.to_string());
            }
        }
    }

    pub fn cycle_company(&mut self, step: isize) {
        if self.companies.is_empty() {
            return;
        }
        let current = self
            .register_form
            .company_id
            .as_ref()
            .and_then(|id| self.companies.iter().position(|c| &c.id == id));
        let next = match current {
            Some(index) => wrap_index(index, step, self.companies.len()),
            None if step >= 0 => 0,
            None => self.companies.len() - 1,
        };
        self.register_form.company_id = Some(self.companies[next].id.clone());
    }

    pub fn selected_company_name(&self) -> Option<&str> {
        let id = self.register_form.company_id.as_ref()?;
        self.companies
            .iter()
            .find(|c| &c.id == id)
            .map(|c| c.name.as_str())
    }

    // --- Manifestation ---

    pub fn cycle_manifest_type(&mut self, step: isize) {
        let current = ManifestType::ALL
            .iter()
            .position(|t| *t == self.manifest_form.kind)
            .unwrap_or(0);
        let next = wrap_index(current, step, ManifestType::ALL.len());
        self.manifest_form.kind = ManifestType::ALL[next];
    }

    pub fn cycle_reason(&mut self, step: isize) {
        self.manifest_form.reason_index =
            wrap_index(self.manifest_form.reason_index, step, MANIFEST_REASONS.len());
    }

    pub fn refine_description(&mut self) {
        if self.loading || self.manifest_form.description.is_empty() {
            return;
        }
        self.loading = true;
        let analysis = self
            .refiner
            .refine(&self.manifest_form.description, self.manifest_form.reason());
        self.manifest_form.analysis = Some(analysis);
        self.loading = false;
    }

    // Adopts the refined wording. The analysis stays on the form so it is
    // persisted with the protocol on submit.
    pub fn apply_refinement(&mut self) {
        if let Some(analysis) = &self.manifest_form.analysis {
            self.manifest_form.description = analysis.refined_text.clone();
        }
    }

    pub fn submit_manifest(&mut self) {
        if self.loading {
            return;
        }
        let Some(user) = self.user.clone() else {
            return;
        };
        self.loading = true;
        let form = &self.manifest_form;
        let input = NewProtocol {
            user_id: user.id.clone(),
            target_company_id: user.company_id.clone(),
            kind: form.kind,
            reason: form.reason().to_string(),
            description: form.description.clone(),
            ai_refinement: form.analysis.as_ref().map(|a| a.refined_text.clone()),
            legal_analysis: form.analysis.as_ref().map(|a| a.legal_analysis.clone()),
        };
        match self.store.create_protocol(&input) {
            Ok(_) => {
                self.show_success("Manifestação enviada com sucesso!");
                self.view = View::Dashboard;
                self.focus = 0;
                self.manifest_form = ManifestForm::default();
                self.load_dashboard_data();
            }
            Err(err) => self.show_error(&err.to_string()),
        }
        self.loading = false;
    }
}

// --- Helpers ---

fn is_valid_enrollment(identifier: &str) -> bool {
    regex::Regex::new(r"^\d+$")
        .map(|re| re.is_match(identifier))
        .unwrap_or(false)
}

fn read_avatar_file(path: &Path) -> anyhow::Result<String> {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    let bytes = fs::read(path)
        .with_context(|| format!("Não foi possível ler o arquivo {}", path.display()))?;
    if bytes.len() > MAX_AVATAR_BYTES {
        bail!("A imagem deve ter no máximo 2MB.");
    }
    Ok(format!(
        "data:{};base64,{}",
        guess_mime(path),
        STANDARD.encode(&bytes)
    ))
}

fn guess_mime(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "image/jpeg",
    }
}

fn wrap_index(current: usize, step: isize, len: usize) -> usize {
    (current as isize + step).rem_euclid(len as isize) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Result as StoreResult, StoreError};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct StoreState {
        users: Vec<(String, User)>, // password, row
        protocols: Vec<Protocol>,
        companies: Vec<CompanySummary>,
        calls: Vec<String>,
        fail: Option<String>,
        next_user_id: usize,
    }

    struct MockStore(Rc<RefCell<StoreState>>);

    impl MockStore {
        fn check_fail(state: &StoreState) -> StoreResult<()> {
            match &state.fail {
                Some(message) => Err(StoreError::Store(message.clone())),
                None => Ok(()),
            }
        }
    }

    impl RowStore for MockStore {
        fn login(
            &self,
            identifier: &str,
            password: &str,
            role: UserRole,
        ) -> StoreResult<Option<User>> {
            let mut state = self.0.borrow_mut();
            state.calls.push("login".to_string());
            Self::check_fail(&state)?;
            Ok(state
                .users
                .iter()
                .find(|(pw, user)| {
                    user.identifier == identifier && pw == password && user.role == role
                })
                .map(|(_, user)| user.clone()))
        }

        fn register(&self, new_user: &NewUser) -> StoreResult<Option<User>> {
            let mut state = self.0.borrow_mut();
            state.calls.push("register".to_string());
            Self::check_fail(&state)?;
            state.next_user_id += 1;
            let user = User {
                id: format!("u{}", state.next_user_id),
                name: new_user.name.clone(),
                identifier: new_user.identifier.clone(),
                role: new_user.role,
                avatar_url: new_user.avatar_url.clone(),
                company_id: new_user.company_id.clone(),
            };
            state.users.push((new_user.password.clone(), user.clone()));
            if user.role == UserRole::Company {
                state.companies.push(CompanySummary {
                    id: user.id.clone(),
                    name: user.name.clone(),
                    avatar_url: user.avatar_url.clone(),
                });
            }
            Ok(Some(user))
        }

        fn companies(&self) -> StoreResult<Vec<CompanySummary>> {
            let mut state = self.0.borrow_mut();
            state.calls.push("companies".to_string());
            Self::check_fail(&state)?;
            Ok(state.companies.clone())
        }

        fn create_protocol(&self, input: &NewProtocol) -> StoreResult<Protocol> {
            let mut state = self.0.borrow_mut();
            state.calls.push("create_protocol".to_string());
            Self::check_fail(&state)?;
            let protocol = Protocol {
                id: format!("PJA-{:06}", 100_000 + state.protocols.len()),
                user_id: input.user_id.clone(),
                target_company_id: input
                    .target_company_id
                    .clone()
                    .filter(|id| !id.is_empty()),
                kind: input.kind,
                reason: input.reason.clone(),
                description: input.description.clone(),
                ai_refinement: input.ai_refinement.clone(),
                legal_analysis: input.legal_analysis.clone(),
                status: crate::models::ProtocolStatus::Received,
                created_at: "2024-06-01T12:00:00.000Z".to_string(),
            };
            state.protocols.insert(0, protocol.clone());
            Ok(protocol)
        }

        fn protocols_for(&self, user_id: &str) -> StoreResult<Vec<Protocol>> {
            let mut state = self.0.borrow_mut();
            state.calls.push("protocols_for".to_string());
            Self::check_fail(&state)?;
            Ok(state
                .protocols
                .iter()
                .filter(|p| p.user_id == user_id)
                .cloned()
                .collect())
        }

        fn company_stats(&self, company_id: &str) -> StoreResult<CompanyStats> {
            let mut state = self.0.borrow_mut();
            state.calls.push("company_stats".to_string());
            Self::check_fail(&state)?;
            let praises = state
                .protocols
                .iter()
                .filter(|p| {
                    p.target_company_id.as_deref() == Some(company_id)
                        && p.kind == ManifestType::Praise
                })
                .cloned()
                .collect();
            let apprentice_count = state
                .users
                .iter()
                .filter(|(_, user)| user.company_id.as_deref() == Some(company_id))
                .count();
            Ok(CompanyStats {
                praises,
                apprentice_count,
            })
        }
    }

    #[derive(Default)]
    struct MockRefiner {
        calls: Rc<RefCell<usize>>,
    }

    impl Refiner for MockRefiner {
        fn refine(&self, description: &str, _reason: &str) -> AiAnalysis {
            *self.calls.borrow_mut() += 1;
            AiAnalysis {
                refined_text: format!("Refinado: {description}"),
                legal_analysis: "Conforme a Lei 10.097/2000.".to_string(),
            }
        }
    }

    fn make_app() -> (App, Rc<RefCell<StoreState>>, Rc<RefCell<usize>>) {
        let state = Rc::new(RefCell::new(StoreState::default()));
        let refiner_calls = Rc::new(RefCell::new(0));
        let refiner = MockRefiner {
            calls: refiner_calls.clone(),
        };
        let app = App::new(Box::new(MockStore(state.clone())), Box::new(refiner));
        (app, state, refiner_calls)
    }

    fn seed_company(state: &Rc<RefCell<StoreState>>) -> User {
        let company = User {
            id: "c1".to_string(),
            name: "Empresa Alfa".to_string(),
            identifier: "12345678000100".to_string(),
            role: UserRole::Company,
            avatar_url: Some("data:image/png;base64,AAAA".to_string()),
            company_id: None,
        };
        let mut s = state.borrow_mut();
        s.users.push(("segredo1".to_string(), company.clone()));
        s.companies.push(CompanySummary {
            id: company.id.clone(),
            name: company.name.clone(),
            avatar_url: company.avatar_url.clone(),
        });
        company
    }

    fn seed_apprentice(state: &Rc<RefCell<StoreState>>) -> User {
        let apprentice = User {
            id: "u1".to_string(),
            name: "Ana Souza".to_string(),
            identifier: "20240101".to_string(),
            role: UserRole::Apprentice,
            avatar_url: None,
            company_id: Some("c1".to_string()),
        };
        state
            .borrow_mut()
            .users
            .push(("segredo1".to_string(), apprentice.clone()));
        apprentice
    }

    fn praise_for(company_id: &str) -> Protocol {
        Protocol {
            id: "PJA-654321".to_string(),
            user_id: "u9".to_string(),
            target_company_id: Some(company_id.to_string()),
            kind: ManifestType::Praise,
            reason: "Ambiente de Trabalho".to_string(),
            description: "Equipe acolhedora.".to_string(),
            ai_refinement: None,
            legal_analysis: None,
            status: crate::models::ProtocolStatus::Received,
            created_at: "2024-06-02T09:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn test_login_requires_both_fields() {
        let (mut app, state, _) = make_app();
        app.submit_login();
        assert_eq!(app.toast.as_ref().unwrap().message, "Preencha todos os campos.");
        assert_eq!(app.toast.as_ref().unwrap().kind, ToastKind::Error);
        assert!(state.borrow().calls.is_empty());
    }

    #[test]
    fn test_login_not_found_shows_fixed_message() {
        let (mut app, _, _) = make_app();
        app.login_form.identifier = "99999".to_string();
        app.login_form.password = "errada".to_string();
        app.submit_login();
        assert!(app.user.is_none());
        assert_eq!(app.view, View::Login);
        assert_eq!(
            app.toast.as_ref().unwrap().message,
            "Credenciais inválidas. Verifique os dados."
        );
    }

    #[test]
    fn test_apprentice_login_loads_protocols() {
        let (mut app, state, _) = make_app();
        seed_apprentice(&state);
        state.borrow_mut().protocols.push(Protocol {
            user_id: "u1".to_string(),
            ..praise_for("c1")
        });

        app.login_form.identifier = "20240101".to_string();
        app.login_form.password = "segredo1".to_string();
        app.submit_login();

        assert_eq!(app.view, View::Dashboard);
        assert_eq!(app.user_role(), Some(UserRole::Apprentice));
        assert_eq!(app.protocols.len(), 1);
        assert_eq!(app.toast.as_ref().unwrap().message, "Bem-vindo, Ana Souza!");
        assert!(!app.loading);
    }

    #[test]
    fn test_role_selector_conditions_login() {
        let (mut app, state, _) = make_app();
        seed_apprentice(&state);
        // Same credentials, but the selector is on company.
        app.role = UserRole::Company;
        app.login_form.identifier = "20240101".to_string();
        app.login_form.password = "segredo1".to_string();
        app.submit_login();
        assert!(app.user.is_none());
        assert_eq!(
            app.toast.as_ref().unwrap().message,
            "Credenciais inválidas. Verifique os dados."
        );
    }

    #[test]
    fn test_company_login_loads_stats() {
        let (mut app, state, _) = make_app();
        seed_company(&state);
        seed_apprentice(&state); // counts as the company's apprentice
        state.borrow_mut().protocols.push(praise_for("c1"));

        app.role = UserRole::Company;
        app.login_form.identifier = "12345678000100".to_string();
        app.login_form.password = "segredo1".to_string();
        app.submit_login();

        assert_eq!(app.view, View::Dashboard);
        assert_eq!(app.stats.praises.len(), 1);
        assert_eq!(app.stats.apprentice_count, 1);
    }

    #[test]
    fn test_store_error_surfaces_verbatim() {
        let (mut app, state, _) = make_app();
        state.borrow_mut().fail = Some("JWT expired".to_string());
        app.login_form.identifier = "20240101".to_string();
        app.login_form.password = "segredo1".to_string();
        app.submit_login();
        assert_eq!(app.toast.as_ref().unwrap().message, "JWT expired");
        assert!(!app.loading);
    }

    #[test]
    fn test_registration_validation_order() {
        let (mut app, state, _) = make_app();
        app.open_register();

        app.submit_registration();
        assert_eq!(
            app.toast.as_ref().unwrap().message,
            "Preencha todos os campos obrigatórios."
        );

        app.register_form.name = "Ana Souza".to_string();
        app.register_form.identifier = "20240101".to_string();
        app.register_form.password = "segredo1".to_string();
        app.register_form.confirm_password = "diferente".to_string();
        app.submit_registration();
        assert_eq!(app.toast.as_ref().unwrap().message, "As senhas não coincidem.");

        app.register_form.password = "abc".to_string();
        app.register_form.confirm_password = "abc".to_string();
        app.submit_registration();
        assert_eq!(
            app.toast.as_ref().unwrap().message,
            "A senha deve ter pelo menos 6 caracteres."
        );

        app.register_form.password = "segredo1".to_string();
        app.register_form.confirm_password = "segredo1".to_string();
        app.submit_registration();
        assert_eq!(
            app.toast.as_ref().unwrap().message,
            "Selecione sua empresa de vínculo."
        );

        app.register_form.company_id = Some("c1".to_string());
        app.register_form.identifier = "2024A101".to_string();
        app.submit_registration();
        assert_eq!(
            app.toast.as_ref().unwrap().message,
            "A matrícula deve conter apenas números."
        );

        // Nothing reached the store while validation was failing.
        assert!(state.borrow().calls.is_empty());
    }

    #[test]
    fn test_company_registration_requires_avatar() {
        let (mut app, state, _) = make_app();
        app.switch_role(UserRole::Company);
        app.open_register();
        app.register_form.name = "Empresa Beta".to_string();
        app.register_form.identifier = "98765432000199".to_string();
        app.register_form.password = "segredo1".to_string();
        app.register_form.confirm_password = "segredo1".to_string();
        app.submit_registration();
        assert_eq!(
            app.toast.as_ref().unwrap().message,
            "Envie uma imagem de identificação da empresa."
        );
        assert!(state.borrow().calls.is_empty());
    }

    #[test]
    fn test_registration_success_prefills_login() {
        let (mut app, state, _) = make_app();
        seed_company(&state);
        app.open_register();
        app.register_form.name = "Ana Souza".to_string();
        app.register_form.identifier = "20240101".to_string();
        app.register_form.password = "segredo1".to_string();
        app.register_form.confirm_password = "segredo1".to_string();
        app.register_form.company_id = Some("c1".to_string());
        app.submit_registration();

        assert_eq!(app.view, View::Login);
        assert_eq!(
            app.toast.as_ref().unwrap().message,
            "Cadastro realizado com sucesso! Faça seu login."
        );
        assert_eq!(app.login_form.identifier, "20240101");
        assert_eq!(app.login_form.password, "segredo1");
        assert!(app.register_form.name.is_empty());

        // The prefill is immediately usable.
        app.submit_login();
        assert_eq!(app.view, View::Dashboard);
    }

    #[test]
    fn test_company_registration_refreshes_picklist() {
        let (mut app, state, _) = make_app();
        app.switch_role(UserRole::Company);
        app.open_register();
        app.register_form.name = "Empresa Beta".to_string();
        app.register_form.identifier = "98765432000199".to_string();
        app.register_form.password = "segredo1".to_string();
        app.register_form.confirm_password = "segredo1".to_string();
        app.register_form.avatar_data = Some("data:image/png;base64,AAAA".to_string());
        app.submit_registration();

        assert!(app.companies.iter().any(|c| c.name == "Empresa Beta"));
        assert!(state.borrow().calls.contains(&"companies".to_string()));
    }

    #[test]
    fn test_role_switch_clears_buffers() {
        let (mut app, _, _) = make_app();
        app.login_form.identifier = "20240101".to_string();
        app.register_form.name = "Ana".to_string();
        app.toggle_role();
        assert_eq!(app.role, UserRole::Company);
        assert!(app.login_form.identifier.is_empty());
        assert!(app.register_form.name.is_empty());
    }

    #[test]
    fn test_login_register_toggle_clears_buffers() {
        let (mut app, _, _) = make_app();
        app.login_form.identifier = "20240101".to_string();
        app.open_register();
        assert!(app.login_form.identifier.is_empty());

        app.register_form.name = "Ana".to_string();
        app.open_login();
        assert!(app.register_form.name.is_empty());
    }

    #[test]
    fn test_sign_out_resets_everything() {
        let (mut app, state, _) = make_app();
        seed_company(&state);
        state.borrow_mut().protocols.push(praise_for("c1"));
        app.role = UserRole::Company;
        app.login_form.identifier = "12345678000100".to_string();
        app.login_form.password = "segredo1".to_string();
        app.submit_login();
        assert!(app.user.is_some());

        app.sign_out();
        assert!(app.user.is_none());
        assert_eq!(app.view, View::Login);
        assert_eq!(app.role, UserRole::Apprentice);
        assert!(app.login_form.identifier.is_empty());
        assert!(app.stats.praises.is_empty());
        assert!(app.protocols.is_empty());
    }

    #[test]
    fn test_refine_requires_description() {
        let (mut app, _, refiner_calls) = make_app();
        app.refine_description();
        assert_eq!(*refiner_calls.borrow(), 0);
        assert!(app.manifest_form.analysis.is_none());
    }

    #[test]
    fn test_refine_and_apply() {
        let (mut app, _, refiner_calls) = make_app();
        app.manifest_form.description = "Relato original.".to_string();
        app.refine_description();
        assert_eq!(*refiner_calls.borrow(), 1);
        let analysis = app.manifest_form.analysis.clone().unwrap();
        assert_eq!(analysis.refined_text, "Refinado: Relato original.");

        app.apply_refinement();
        assert_eq!(app.manifest_form.description, "Refinado: Relato original.");
        // Still available for persistence on submit.
        assert!(app.manifest_form.analysis.is_some());
    }

    #[test]
    fn test_submit_manifest_persists_analysis() {
        let (mut app, state, _) = make_app();
        seed_apprentice(&state);
        app.login_form.identifier = "20240101".to_string();
        app.login_form.password = "segredo1".to_string();
        app.submit_login();

        app.open_new_manifest();
        app.manifest_form.kind = ManifestType::Doubt;
        app.manifest_form.reason_index = 1;
        app.manifest_form.description = "Tenho uma dúvida.".to_string();
        app.refine_description();
        app.submit_manifest();

        assert_eq!(app.view, View::Dashboard);
        assert_eq!(
            app.toast.as_ref().unwrap().message,
            "Manifestação enviada com sucesso!"
        );
        assert!(app.manifest_form.description.is_empty());
        assert_eq!(app.protocols.len(), 1);
        let created = &app.protocols[0];
        assert_eq!(created.kind, ManifestType::Doubt);
        assert_eq!(created.reason, "Carga Horária / Horários");
        assert_eq!(created.target_company_id.as_deref(), Some("c1"));
        assert_eq!(
            created.ai_refinement.as_deref(),
            Some("Refinado: Tenho uma dúvida.")
        );
        assert!(created.legal_analysis.is_some());
    }

    #[test]
    fn test_submit_manifest_store_error_keeps_view() {
        let (mut app, state, _) = make_app();
        seed_apprentice(&state);
        app.login_form.identifier = "20240101".to_string();
        app.login_form.password = "segredo1".to_string();
        app.submit_login();
        app.open_new_manifest();
        app.manifest_form.description = "Relato.".to_string();

        state.borrow_mut().fail = Some("permission denied for table protocols".to_string());
        app.submit_manifest();
        assert_eq!(app.view, View::NewManifest);
        assert_eq!(
            app.toast.as_ref().unwrap().message,
            "permission denied for table protocols"
        );
        assert!(!app.loading);
    }

    #[test]
    fn test_praise_appears_after_refresh() {
        let (mut app, state, _) = make_app();
        seed_company(&state);
        app.role = UserRole::Company;
        app.login_form.identifier = "12345678000100".to_string();
        app.login_form.password = "segredo1".to_string();
        app.submit_login();
        assert!(app.stats.praises.is_empty());

        state.borrow_mut().protocols.insert(0, praise_for("c1"));
        app.refresh_dashboard();
        assert_eq!(app.stats.praises.len(), 1);
        assert_eq!(app.stats.praises[0].description, "Equipe acolhedora.");
    }

    #[test]
    fn test_company_cannot_open_manifest_views() {
        let (mut app, state, _) = make_app();
        seed_company(&state);
        app.role = UserRole::Company;
        app.login_form.identifier = "12345678000100".to_string();
        app.login_form.password = "segredo1".to_string();
        app.submit_login();

        app.open_new_manifest();
        assert_eq!(app.view, View::Dashboard);
        app.open_history();
        assert_eq!(app.view, View::Dashboard);
    }

    #[test]
    fn test_open_new_manifest_resets_scroll() {
        let (mut app, state, _) = make_app();
        seed_apprentice(&state);
        app.login_form.identifier = "20240101".to_string();
        app.login_form.password = "segredo1".to_string();
        app.submit_login();

        app.scroll = 9;
        app.open_new_manifest();
        assert_eq!(app.view, View::NewManifest);
        assert_eq!(app.scroll, 0);
    }

    #[test]
    fn test_avatar_rejects_oversized_file() {
        let path = std::env::temp_dir().join("pja-avatar-too-big.png");
        fs::write(&path, vec![0u8; MAX_AVATAR_BYTES + 1]).unwrap();

        let (mut app, _, _) = make_app();
        app.register_form.avatar_path = path.to_string_lossy().to_string();
        app.load_avatar();

        fs::remove_file(&path).ok();
        assert_eq!(
            app.toast.as_ref().unwrap().message,
            "A imagem deve ter no máximo 2MB."
        );
        assert!(app.register_form.avatar_data.is_none());
    }

    #[test]
    fn test_avatar_loads_as_data_uri() {
        let path = std::env::temp_dir().join("pja-avatar-ok.png");
        fs::write(&path, [137u8, 80, 78, 71]).unwrap();

        let (mut app, _, _) = make_app();
        app.register_form.avatar_path = path.to_string_lossy().to_string();
        app.load_avatar();

        fs::remove_file(&path).ok();
        let data = app.register_form.avatar_data.unwrap();
        assert!(data.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_cycle_company_wraps() {
        let (mut app, state, _) = make_app();
        seed_company(&state);
        state.borrow_mut().companies.push(CompanySummary {
            id: "c2".to_string(),
            name: "Empresa Beta".to_string(),
            avatar_url: None,
        });
        app.refresh_companies();

        app.cycle_company(1);
        assert_eq!(app.selected_company_name(), Some("Empresa Alfa"));
        app.cycle_company(1);
        assert_eq!(app.selected_company_name(), Some("Empresa Beta"));
        app.cycle_company(1);
        assert_eq!(app.selected_company_name(), Some("Empresa Alfa"));
        app.cycle_company(-1);
        assert_eq!(app.selected_company_name(), Some("Empresa Beta"));
    }

    #[test]
    fn test_cycle_manifest_type_and_reason() {
        let (mut app, _, _) = make_app();
        assert_eq!(app.manifest_form.kind, ManifestType::Complaint);
        app.cycle_manifest_type(1);
        assert_eq!(app.manifest_form.kind, ManifestType::Doubt);
        app.cycle_manifest_type(-1);
        assert_eq!(app.manifest_form.kind, ManifestType::Complaint);
        app.cycle_manifest_type(-1);
        assert_eq!(app.manifest_form.kind, ManifestType::Praise);

        assert_eq!(app.manifest_form.reason(), "Ambiente de Trabalho");
        app.cycle_reason(-1);
        assert_eq!(app.manifest_form.reason(), "Outros");
        app.cycle_reason(1);
        assert_eq!(app.manifest_form.reason(), "Ambiente de Trabalho");
    }

    #[test]
    fn test_is_valid_enrollment() {
        assert!(is_valid_enrollment("20240101"));
        assert!(!is_valid_enrollment("2024A101"));
        assert!(!is_valid_enrollment("2024 0101"));
        assert!(!is_valid_enrollment(""));
    }

    #[test]
    fn test_wrap_index() {
        assert_eq!(wrap_index(0, 1, 3), 1);
        assert_eq!(wrap_index(2, 1, 3), 0);
        assert_eq!(wrap_index(0, -1, 3), 2);
    }

    #[test]
    fn test_fresh_toast_not_expired() {
        let toast = Toast::new("ok", ToastKind::Success);
        assert!(!toast.is_expired());
    }
}
