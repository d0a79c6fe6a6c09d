use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::client::{
    AuthService, Config, FileSessionStorage, NavigationTracker, RideApiClient, RideBookingWorkflow,
    RideHistoryWorkflow, RideRequestWorkflow, SampleLocationProvider, Session, SessionStore, SignInForm,
    SignUpForm,
};
use crate::shared::location::Coordinates;
use crate::shared::user::{Role, SessionIdentity};

/// Current top-level view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppView {
    /// Sign-in / sign-up screen
    Auth,
    Passenger,
    Driver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassengerTab {
    BookRide,
    MyRides,
}

type AuthResult = Result<SessionIdentity, String>;

/// Central application state shared across egui views.
pub struct AppState {
    pub config: Config,
    pub session: SessionStore,
    api: Arc<RideApiClient>,
    locations: Arc<SampleLocationProvider>,
    auth: AuthService,
    session_rx: watch::Receiver<Option<Session>>,

    pub current_view: AppView,
    pub username_input: String,
    pub email_input: String,
    pub firstname_input: String,
    pub lastname_input: String,
    pub password_input: String,
    pub confirm_password_input: String,
    pub selected_role: Role,
    pub is_signup_mode: bool,
    pub auth_error: Option<String>,
    pub auth_loading: bool,
    auth_result: Option<mpsc::UnboundedReceiver<AuthResult>>,

    pub passenger_tab: PassengerTab,
    pub booking: Option<RideBookingWorkflow>,
    pub history: Option<RideHistoryWorkflow>,
    pub requests: Option<RideRequestWorkflow>,
    pub navigation: Option<NavigationTracker>,
}

impl AppState {
    /// Must be called inside a tokio runtime context.
    pub fn new(config: Config) -> Self {
        let session = SessionStore::restore(FileSessionStorage::new(config.session_file()));
        let api = Arc::new(RideApiClient::new(config.clone(), session.clone()));
        let locations = Arc::new(
            SampleLocationProvider::for_position(config.app().device_position)
                .with_timeout(config.app().geolocation_timeout()),
        );
        let auth = AuthService::new(api.clone(), session.clone());
        let session_rx = session.subscribe();

        let mut state = Self {
            config,
            session,
            api,
            locations,
            auth,
            session_rx,
            current_view: AppView::Auth,
            username_input: String::new(),
            email_input: String::new(),
            firstname_input: String::new(),
            lastname_input: String::new(),
            password_input: String::new(),
            confirm_password_input: String::new(),
            selected_role: Role::Passenger,
            is_signup_mode: false,
            auth_error: None,
            auth_loading: false,
            auth_result: None,
            passenger_tab: PassengerTab::BookRide,
            booking: None,
            history: None,
            requests: None,
            navigation: None,
        };
        if let Some(role) = state.session.role() {
            state.enter_dashboard(role);
        }
        state
    }

    /// Fold in async results. Called once per frame.
    pub fn update(&mut self) {
        self.check_auth_result();
        self.check_session();

        if let Some(booking) = self.booking.as_mut() {
            booking.poll();
        }
        if let Some(history) = self.history.as_mut() {
            history.poll();
        }
        if let Some(requests) = self.requests.as_mut() {
            requests.poll();
        }
    }

    pub fn check_auth_result(&mut self) {
        let Some(rx) = self.auth_result.as_mut() else {
            return;
        };
        let Ok(result) = rx.try_recv() else {
            return;
        };
        self.auth_result = None;
        self.auth_loading = false;

        match result {
            Ok(identity) => {
                tracing::info!(user = %identity.name, role = %identity.role, "authentication successful");
                self.auth_error = None;
                self.password_input.clear();
                self.confirm_password_input.clear();
                self.is_signup_mode = false;
                // Consume the notification caused by our own sign-in.
                self.session_rx.borrow_and_update();
                self.enter_dashboard(identity.role);
            }
            Err(e) => {
                tracing::warn!(error = %e, "authentication failed");
                self.auth_error = Some(e);
            }
        }
    }

    /// Leave the dashboards when the session disappears (sign-out elsewhere
    /// or a rejected token).
    fn check_session(&mut self) {
        if !self.session_rx.has_changed().unwrap_or(false) {
            return;
        }
        let signed_in = self.session_rx.borrow_and_update().is_some();
        if !signed_in && self.current_view != AppView::Auth {
            self.leave_dashboard();
            self.auth_error = Some("Your session has expired. Please sign in again.".to_string());
        }
    }

    fn enter_dashboard(&mut self, role: Role) {
        self.leave_dashboard();
        let search_delay = self.config.app().search_debounce();
        match role {
            Role::Passenger => {
                let mut booking = RideBookingWorkflow::new(
                    self.api.clone(),
                    self.locations.clone(),
                    self.session.clone(),
                    search_delay,
                );
                booking.mount();
                self.booking = Some(booking);
                self.history = Some(RideHistoryWorkflow::new(self.api.clone(), self.session.clone()));
                self.passenger_tab = PassengerTab::BookRide;
                self.current_view = AppView::Passenger;
            }
            Role::Driver => {
                let mut requests = RideRequestWorkflow::new(self.api.clone());
                requests.mount();
                self.requests = Some(requests);
                self.current_view = AppView::Driver;
            }
        }
    }

    fn leave_dashboard(&mut self) {
        self.booking = None;
        self.history = None;
        self.requests = None;
        self.navigation = None;
        self.current_view = AppView::Auth;
    }

    pub fn show_my_rides(&mut self) {
        self.passenger_tab = PassengerTab::MyRides;
        if let Some(history) = self.history.as_mut() {
            history.load();
        }
    }

    pub fn handle_login(&mut self) {
        let form = SignInForm {
            username: self.username_input.clone(),
            password: self.password_input.clone(),
            role: self.selected_role,
        };
        if let Err(e) = form.validate() {
            self.auth_error = Some(e.message);
            return;
        }

        let auth = self.auth.clone();
        self.spawn_auth(async move { auth.sign_in(&form).await.map_err(|e| e.user_message()) });
    }

    pub fn handle_signup(&mut self) {
        let form = SignUpForm {
            username: self.username_input.clone(),
            email: self.email_input.clone(),
            firstname: self.firstname_input.clone(),
            lastname: self.lastname_input.clone(),
            password: self.password_input.clone(),
            password2: self.confirm_password_input.clone(),
            role: self.selected_role,
        };
        if let Err(e) = form.validate() {
            self.auth_error = Some(e.message);
            return;
        }

        let auth = self.auth.clone();
        self.spawn_auth(async move { auth.sign_up(&form).await.map_err(|e| e.user_message()) });
    }

    fn spawn_auth<F>(&mut self, flow: F)
    where
        F: std::future::Future<Output = AuthResult> + Send + 'static,
    {
        self.auth_loading = true;
        self.auth_error = None;
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let _ = tx.send(flow.await);
        });
        self.auth_result = Some(rx);
    }

    pub fn logout(&mut self) {
        if let Err(e) = self.auth.sign_out() {
            tracing::warn!(error = %e, "could not clear saved session");
        }
        self.session_rx.borrow_and_update();
        self.leave_dashboard();
        self.username_input.clear();
        self.email_input.clear();
        self.firstname_input.clear();
        self.lastname_input.clear();
        self.password_input.clear();
        self.confirm_password_input.clear();
        self.auth_error = None;
    }

    pub fn toggle_auth_mode(&mut self) {
        self.is_signup_mode = !self.is_signup_mode;
        self.auth_error = None;
        self.password_input.clear();
        self.confirm_password_input.clear();
    }

    /// Start tracking the driver's position towards `pickup`.
    pub fn start_navigation(&mut self, pickup: Coordinates) {
        self.navigation = Some(NavigationTracker::start(
            self.locations.clone(),
            pickup,
            self.config.app().navigation_refresh(),
        ));
    }

    pub fn stop_navigation(&mut self) {
        self.navigation = None;
    }

    pub fn identity(&self) -> Option<SessionIdentity> {
        self.session.identity()
    }
}
