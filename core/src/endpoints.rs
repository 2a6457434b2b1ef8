//! One method per Ecomail API action.
//!
//! Paths are built by plain concatenation: identifiers and e-mail addresses
//! are inserted as given, without URL encoding. The verbs follow the remote
//! API exactly, including `send_campaign` being a GET and the `/delete`
//! suffixes on some DELETE routes.

use std::fmt::Display;

use serde::Serialize;

use crate::client::Client;
use crate::error::ApiError;
use crate::http::HttpMethod;
use crate::transport::Transport;
use crate::types::{to_payload, Response};

impl<T: Transport> Client<T> {
    // --- lists ---

    /// All mailing lists of the account.
    pub fn get_lists_collection(&self) -> Result<Response, ApiError> {
        self.get("lists")
    }

    /// Create a mailing list.
    pub fn add_list_collection<P: Serialize + ?Sized>(&self, data: &P) -> Result<Response, ApiError> {
        self.post("lists", data)
    }

    /// One list with its subscriber counts.
    pub fn show_list(&self, list_id: impl Display) -> Result<Response, ApiError> {
        self.get(&format!("lists/{list_id}"))
    }

    /// Change list settings (PUT).
    pub fn update_list<P: Serialize + ?Sized>(
        &self,
        list_id: impl Display,
        data: &P,
    ) -> Result<Response, ApiError> {
        self.put(&format!("lists/{list_id}"), data)
    }

    /// Subscribers of one list.
    pub fn get_subscribers(&self, list_id: impl Display) -> Result<Response, ApiError> {
        self.get(&format!("lists/{list_id}/subscribers"))
    }

    /// One subscriber of a list, looked up by address.
    pub fn get_subscriber(&self, list_id: impl Display, email: &str) -> Result<Response, ApiError> {
        self.get(&format!("lists/{list_id}/subscriber/{email}"))
    }

    /// Every list the address belongs to.
    pub fn get_subscriber_list(&self, email: &str) -> Result<Response, ApiError> {
        self.get(&format!("subscribers/{email}"))
    }

    /// Subscribe one address to a list.
    pub fn add_subscriber<P: Serialize + ?Sized>(
        &self,
        list_id: impl Display,
        data: &P,
    ) -> Result<Response, ApiError> {
        self.post(&format!("lists/{list_id}/subscribe"), data)
    }

    /// Unsubscribe an address from a list. A DELETE that carries `data` as
    /// its body.
    pub fn remove_subscriber<P: Serialize + ?Sized>(
        &self,
        list_id: impl Display,
        data: &P,
    ) -> Result<Response, ApiError> {
        self.delete_with(&format!("lists/{list_id}/unsubscribe"), data)
    }

    /// Change a subscriber's data within a list (PUT).
    pub fn update_subscriber<P: Serialize + ?Sized>(
        &self,
        list_id: impl Display,
        data: &P,
    ) -> Result<Response, ApiError> {
        self.put(&format!("lists/{list_id}/update-subscriber"), data)
    }

    /// Subscribe many addresses to a list in one call.
    pub fn add_subscriber_bulk<P: Serialize + ?Sized>(
        &self,
        list_id: impl Display,
        data: &P,
    ) -> Result<Response, ApiError> {
        self.post(&format!("lists/{list_id}/subscribe-bulk"), data)
    }

    // --- subscribers ---

    /// Remove the address from the whole account, not just one list.
    pub fn delete_subscriber(&self, email: &str) -> Result<Response, ApiError> {
        self.delete(&format!("subscribers/{email}/delete"))
    }

    // --- campaigns ---

    /// All campaigns; `filters` is appended verbatim as the `filters` query
    /// parameter.
    pub fn list_campaigns(&self, filters: Option<&str>) -> Result<Response, ApiError> {
        match filters {
            Some(filters) => self.get(&format!("campaigns?filters={filters}")),
            None => self.get("campaigns"),
        }
    }

    /// Create a campaign draft.
    pub fn add_campaign<P: Serialize + ?Sized>(&self, data: &P) -> Result<Response, ApiError> {
        self.post("campaigns", data)
    }

    /// Change a campaign (PUT).
    pub fn update_campaign<P: Serialize + ?Sized>(
        &self,
        campaign_id: impl Display,
        data: &P,
    ) -> Result<Response, ApiError> {
        self.put(&format!("campaigns/{campaign_id}"), data)
    }

    /// Queue the campaign for sending immediately. Cannot be undone.
    pub fn send_campaign(&self, campaign_id: impl Display) -> Result<Response, ApiError> {
        self.get(&format!("campaign/{campaign_id}/send"))
    }

    /// Delivery statistics of a campaign.
    pub fn get_campaign_stats(&self, campaign_id: impl Display) -> Result<Response, ApiError> {
        self.get(&format!("campaigns/{campaign_id}/stats"))
    }

    // --- automations ---

    pub fn list_automations(&self) -> Result<Response, ApiError> {
        self.get("automation")
    }

    /// Start an automation (pipeline) for the contact in `data`.
    pub fn trigger_automation<P: Serialize + ?Sized>(
        &self,
        automation_id: impl Display,
        data: &P,
    ) -> Result<Response, ApiError> {
        self.post(&format!("pipelines/{automation_id}/trigger"), data)
    }

    // --- templates ---

    /// Create an e-mail template.
    pub fn create_template<P: Serialize + ?Sized>(&self, data: &P) -> Result<Response, ApiError> {
        self.post("template", data)
    }

    // --- domains ---

    pub fn list_domains(&self) -> Result<Response, ApiError> {
        self.get("domains")
    }

    /// Register a sending domain.
    pub fn create_domain<P: Serialize + ?Sized>(&self, data: &P) -> Result<Response, ApiError> {
        self.post("domains", data)
    }

    /// Remove a sending domain. A plain DELETE without a body.
    pub fn delete_domain(&self, id: impl Display) -> Result<Response, ApiError> {
        self.delete(&format!("domains/{id}"))
    }

    // --- transactional e-mails ---

    /// Send one transactional message with its content in `data`.
    pub fn send_transactional_email<P: Serialize + ?Sized>(&self, data: &P) -> Result<Response, ApiError> {
        self.post("transactional/send-message", data)
    }

    /// Send one transactional message rendered from a stored template.
    pub fn send_transactional_template<P: Serialize + ?Sized>(
        &self,
        data: &P,
    ) -> Result<Response, ApiError> {
        self.post("transactional/send-template", data)
    }

    // --- tracker ---

    /// Record an e-commerce transaction for tracking.
    pub fn create_new_transaction<P: Serialize + ?Sized>(&self, data: &P) -> Result<Response, ApiError> {
        self.post("tracker/transaction", data)
    }

    /// Delete a tracked transaction. A DELETE on the `/delete` suffixed
    /// path, without a body.
    pub fn delete_transaction(&self, id: impl Display) -> Result<Response, ApiError> {
        self.delete(&format!("tracker/transaction/{id}/delete"))
    }

    /// Change a tracked transaction (PUT).
    pub fn update_transaction<P: Serialize + ?Sized>(
        &self,
        transaction_id: impl Display,
        data: &P,
    ) -> Result<Response, ApiError> {
        self.put(&format!("tracker/transaction/{transaction_id}"), data)
    }

    // --- verb helpers ---

    fn get(&self, path: &str) -> Result<Response, ApiError> {
        self.send(path, None, None)
    }

    fn post<P: Serialize + ?Sized>(&self, path: &str, data: &P) -> Result<Response, ApiError> {
        let payload = to_payload(data)?;
        self.send(path, Some(&payload), None)
    }

    fn put<P: Serialize + ?Sized>(&self, path: &str, data: &P) -> Result<Response, ApiError> {
        let payload = to_payload(data)?;
        self.send(path, Some(&payload), Some(HttpMethod::Put))
    }

    fn delete(&self, path: &str) -> Result<Response, ApiError> {
        self.send(path, None, Some(HttpMethod::Delete))
    }

    fn delete_with<P: Serialize + ?Sized>(&self, path: &str, data: &P) -> Result<Response, ApiError> {
        let payload = to_payload(data)?;
        self.send(path, Some(&payload), Some(HttpMethod::Delete))
    }
}
