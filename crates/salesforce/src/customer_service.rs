//! Customer service facade over standard objects (Case, Order, Contact, ...).
//!
//! Records keep their Salesforce field names on the wire. Every field is
//! optional so the same types serve reads, creates and partial updates.

use {
    serde::{Deserialize, Serialize},
    serde_json::json,
    tracing::{debug, error},
};

use crate::{
    Error, Result,
    client::{CreateResult, SalesforceApi},
    soql,
};

/// Default page size for case and order listings.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

macro_rules! sobject {
    ($(#[$meta:meta])* $name:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all = "PascalCase")]
        pub struct $name {
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub id: Option<String>,
            $(
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub $field: Option<$ty>,
            )*
        }
    };
}

sobject!(Case {
    case_number: String,
    subject: String,
    description: String,
    status: String,
    priority: String,
    origin: String,
    contact_id: String,
    contact_email: String,
    created_date: String,
    last_modified_date: String,
});

sobject!(Contact {
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    account_id: String,
});

sobject!(Order {
    order_number: String,
    status: String,
    effective_date: String,
    account_id: String,
    total_amount: f64,
});

sobject!(OrderItem {
    order_id: String,
    product2_id: String,
    quantity: f64,
    unit_price: f64,
    total_price: f64,
});

sobject!(
    /// A `Product2` record.
    Product {
        name: String,
        product_code: String,
        description: String,
        is_active: bool,
        family: String,
    }
);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnItem {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnConfirmation {
    pub return_id: String,
    pub return_label: String,
}

const CASE_FIELDS: &str =
    "Id, CaseNumber, Subject, Description, Status, Priority, Origin, ContactId, CreatedDate, LastModifiedDate";
const ORDER_FIELDS: &str = "Id, OrderNumber, Status, EffectiveDate, AccountId, TotalAmount";
const CONTACT_FIELDS: &str = "Id, FirstName, LastName, Email, Phone, AccountId";

pub struct CustomerService<'a> {
    api: &'a SalesforceApi,
}

impl<'a> CustomerService<'a> {
    pub fn new(api: &'a SalesforceApi) -> Self {
        Self { api }
    }

    // ── Cases ───────────────────────────────────────────────────────────────

    /// Most recent cases first.
    pub async fn list_cases(&self, limit: u32, offset: u32) -> Result<Vec<Case>> {
        let soql = format!(
            "SELECT {CASE_FIELDS} FROM Case ORDER BY CreatedDate DESC LIMIT {limit} OFFSET {offset}"
        );
        let page = self
            .api
            .query::<Case>(&soql)
            .await
            .inspect_err(|e| error!(error = %e, "error fetching cases"))?;
        Ok(page.records)
    }

    pub async fn get_case(&self, id: &str) -> Result<Case> {
        self.api
            .get(&self.api.sobject_path("Case", Some(id)))
            .await
            .inspect_err(|e| error!(case_id = id, error = %e, "error fetching case"))
    }

    pub async fn create_case(&self, case: &Case) -> Result<String> {
        let result: CreateResult = self
            .api
            .post(&self.api.sobject_path("Case", None), case)
            .await
            .inspect_err(|e| error!(error = %e, "error creating case"))?;
        if !result.success {
            error!("Salesforce rejected case creation");
            return Err(Error::OperationFailed("Failed to create case".into()));
        }
        Ok(result.id)
    }

    pub async fn update_case(&self, id: &str, changes: &Case) -> Result<()> {
        self.api
            .patch(&self.api.sobject_path("Case", Some(id)), changes)
            .await
            .inspect_err(|e| error!(case_id = id, error = %e, "error updating case"))
    }

    // ── Orders ──────────────────────────────────────────────────────────────

    pub async fn list_orders(&self, limit: u32, offset: u32) -> Result<Vec<Order>> {
        let soql = format!(
            "SELECT {ORDER_FIELDS} FROM Order ORDER BY EffectiveDate DESC LIMIT {limit} OFFSET {offset}"
        );
        let page = self
            .api
            .query::<Order>(&soql)
            .await
            .inspect_err(|e| error!(error = %e, "error fetching orders"))?;
        Ok(page.records)
    }

    /// Look an order up by its order number, falling back to the record id
    /// when no order carries that number.
    pub async fn get_order(&self, id_or_number: &str) -> Result<Order> {
        self.find_order(id_or_number)
            .await
            .inspect_err(|e| error!(order = id_or_number, error = %e, "error fetching order"))
    }

    async fn find_order(&self, id_or_number: &str) -> Result<Order> {
        let soql = format!(
            "SELECT {ORDER_FIELDS} FROM Order WHERE OrderNumber = {}",
            soql::quote(id_or_number)
        );
        let page = self.api.query::<Order>(&soql).await?;
        if let Some(order) = page.records.into_iter().next() {
            return Ok(order);
        }
        debug!(order = id_or_number, "no order with that number, fetching by id");
        self.api
            .get(&self.api.sobject_path("Order", Some(id_or_number)))
            .await
    }

    pub async fn get_order_items(&self, order_id: &str) -> Result<Vec<OrderItem>> {
        let soql = format!(
            "SELECT Id, OrderId, Product2Id, Quantity, UnitPrice, TotalPrice FROM OrderItem WHERE OrderId = {}",
            soql::quote(order_id)
        );
        let page = self
            .api
            .query::<OrderItem>(&soql)
            .await
            .inspect_err(|e| error!(order_id, error = %e, "error fetching order items"))?;
        Ok(page.records)
    }

    pub async fn get_product(&self, product_id: &str) -> Result<Product> {
        self.api
            .get(&self.api.sobject_path("Product2", Some(product_id)))
            .await
            .inspect_err(|e| error!(product_id, error = %e, "error fetching product"))
    }

    /// Invoke the `createReturn` custom action for an order.
    pub async fn create_return_request(
        &self,
        order_id: &str,
        reason: &str,
        items: &[ReturnItem],
    ) -> Result<ReturnConfirmation> {
        let body = json!({
            "OrderId": order_id,
            "Reason": reason,
            "Items": items,
        });
        self.api
            .post(&self.api.data_path("actions/custom/return/createReturn"), &body)
            .await
            .inspect_err(|e| error!(order_id, error = %e, "error creating return request"))
    }

    // ── Customers ───────────────────────────────────────────────────────────

    /// Look a contact up by email when the identifier contains `@`, falling
    /// back to the record id.
    pub async fn get_customer(&self, id_or_email: &str) -> Result<Contact> {
        self.find_customer(id_or_email)
            .await
            .inspect_err(|e| error!(customer = id_or_email, error = %e, "error fetching customer"))
    }

    async fn find_customer(&self, id_or_email: &str) -> Result<Contact> {
        if id_or_email.contains('@') {
            let soql = format!(
                "SELECT {CONTACT_FIELDS} FROM Contact WHERE Email = {}",
                soql::quote(id_or_email)
            );
            let page = self.api.query::<Contact>(&soql).await?;
            if let Some(contact) = page.records.into_iter().next() {
                return Ok(contact);
            }
        }
        self.api
            .get(&self.api.sobject_path("Contact", Some(id_or_email)))
            .await
    }

    pub async fn update_customer(&self, id: &str, changes: &Contact) -> Result<()> {
        self.api
            .patch(&self.api.sobject_path("Contact", Some(id)), changes)
            .await
            .inspect_err(|e| error!(customer_id = id, error = %e, "error updating customer"))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_use_salesforce_field_names() {
        let item: OrderItem = serde_json::from_value(json!({
            "attributes": { "type": "OrderItem" },
            "Id": "802xx",
            "OrderId": "801xx",
            "Product2Id": "01txx",
            "Quantity": 2.0,
            "UnitPrice": 9.5,
            "TotalPrice": null,
        }))
        .unwrap();
        assert_eq!(item.product2_id.as_deref(), Some("01txx"));
        assert_eq!(item.total_price, None);
    }

    #[test]
    fn partial_updates_skip_unset_fields() {
        let changes = Case {
            status: Some("Closed".into()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&changes).unwrap(), json!({ "Status": "Closed" }));
    }

    #[test]
    fn return_items_are_camel_case() {
        let item = ReturnItem {
            product_id: "01txx".into(),
            quantity: 1,
        };
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({ "productId": "01txx", "quantity": 1 })
        );
    }
}
