//! # Repository Layer
//!
//! SeaORM data access. Tenant-owned tables go through [`scoped`], which puts
//! the primary key and the owning organization in the same `WHERE` clause.

pub mod agent;
pub mod approval;
pub mod batch_call;
pub mod billing_package;
pub mod call_log;
pub mod integration;
pub mod organization;
pub mod payment;
pub mod phone_number;
pub mod rag_configuration;
pub mod scoped;
pub mod user;

pub use agent::{AgentChanges, AgentRepository, NewAgent};
pub use batch_call::{BatchCallRepository, BatchCallSummary, NewBatchCall};
pub use billing_package::{BillingPackageRepository, NewBillingPackage};
pub use call_log::{CallLogRepository, NewCallLog};
pub use integration::{IntegrationRepository, NewIntegration};
pub use organization::{NewOrganization, OrganizationRepository};
pub use payment::{NewPayment, PaymentRepository};
pub use phone_number::{NewPhoneNumber, PhoneNumberRepository};
pub use rag_configuration::{NewRagConfiguration, RagConfigurationRepository};
pub use scoped::ScopedRepository;
pub use user::{NewUser, UserRepository};
