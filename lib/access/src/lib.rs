//! Authorization and session handling for guild-gallery.
//!
//! This crate provides:
//! - Login inputs from the identity provider (`Identity`, `AccessToken`)
//! - Guild role lookups (`MembershipService`, `MembershipRecord`)
//! - The role check that decides whether a login yields a session
//!   (`AuthorizationGate`)
//! - Session values and their persistence interface (`Session`,
//!   `SessionStore`, `MemorySessionStore`)
//! - The shared site password (`SitePassword`)
//!
//! # Access Control Model
//!
//! A user may only hold an authenticated session after the membership
//! service confirmed that they carry the configured role in the configured
//! guild. `SessionUser` has no public constructor, so the only way to get
//! one is through a successful `AuthorizationGate::authorize` call or by
//! loading a session that was persisted after such a call.
//!
//! # Example
//!
//! ```
//! use async_trait::async_trait;
//! use guild_gallery_access::{
//!     AccessToken, AuthorizationGate, GateConfig, GroupId, Identity, MembershipQueryError,
//!     MembershipRecord, MembershipService, RoleId,
//! };
//!
//! struct Fixed;
//!
//! #[async_trait]
//! impl MembershipService for Fixed {
//!     async fn fetch_membership(
//!         &self,
//!         _group_id: &GroupId,
//!         _token: &AccessToken,
//!     ) -> Result<MembershipRecord, MembershipQueryError> {
//!         Ok(MembershipRecord::from_roles([RoleId::from("614416579475669014")]))
//!     }
//! }
//!
//! # tokio_test_block_on(async {
//! let gate = AuthorizationGate::new(
//!     Fixed,
//!     GateConfig::new(
//!         GroupId::from("614405243773386753"),
//!         RoleId::from("614416579475669014"),
//!     ),
//! );
//!
//! let identity = Identity::new("42", "Ada", None);
//! let session = gate
//!     .authorize(&identity, &AccessToken::new("token"))
//!     .await
//!     .expect("role is present");
//!
//! assert_eq!(session.user().map(|u| u.external_id()), Some("42"));
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread()
//! #         .enable_time()
//! #         .build()
//! #         .expect("runtime")
//! #         .block_on(f)
//! # }
//! ```

pub mod config;
pub mod error;
pub mod gate;
pub mod identity;
pub mod membership;
pub mod session;
pub mod site;
pub mod store;

// Re-export main types at crate root
pub use config::GateConfig;
pub use error::{AuthzError, MembershipQueryError, SessionStoreError};
pub use gate::AuthorizationGate;
pub use identity::{AccessToken, GroupId, Identity, RoleId};
pub use membership::{MembershipRecord, MembershipService};
pub use session::{Session, SessionUser};
pub use site::SitePassword;
pub use store::{MemorySessionStore, SessionStore};
