//! Building order records from a cart, a parcel-pickup booking or a
//! retailer's bulk list.

use crate::cart::format_ghs;
use crate::{Cart, Catalog, CheckoutError, CheckoutResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

pub const ORDER_TYPE_SUPERMARKET: &str = "Supermarket";
pub const ORDER_TYPE_PICKUP: &str = "Jumia Delivery";
pub const PICKUP_SUPERMARKET: &str = "Jumia";
pub const PICKUP_ITEMS: &str = "Jumia Parcel Pickup";
pub const PICKUP_TOTAL: &str = "N/A";
pub const ORDER_TYPE_BULK: &str = "Retailer Bulk Order";
pub const BULK_SUPERMARKET: &str = "Bulk-Retail";
pub const BULK_TOTAL: &str = "TBD";

/// Chat the WhatsApp quick-send link opens.
const WHATSAPP_CHAT: &str = "https://wa.me/233551836194";
/// Items listed in a quick-send message before it says "(and more)".
const WHATSAPP_ITEM_LIMIT: usize = 8;

/// Customer details collected at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub email: String,
    pub order_numbers: String,
    pub notes: String,
}

impl CheckoutForm {
    /// Check required fields, returning a copy with them trimmed.
    fn validated(&self) -> CheckoutResult<CheckoutForm> {
        let name = required("name", &self.name)?;
        let phone = required("phone", &self.phone)?;
        let address = required("address", &self.address)?;
        Ok(CheckoutForm {
            name,
            phone,
            address,
            email: self.email.clone(),
            order_numbers: self.order_numbers.trim().to_string(),
            notes: self.notes.clone(),
        })
    }
}

fn required(field: &'static str, value: &str) -> CheckoutResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CheckoutError::MissingField(field));
    }
    Ok(value.to_string())
}

/// The flat record the order sheet stores, one row per order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    /// Parcel or order numbers from the customer. Bulk orders have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_numbers: Option<String>,
    /// Person to talk to at the retailer; only bulk orders carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    pub supermarket: String,
    pub order_type: String,
    /// Human-readable line items, e.g. `Bread Loaf (x2), Fresh Milk (2L) (x1)`.
    pub items: String,
    pub total: String,
    pub notes: String,
}

impl OrderRecord {
    /// JSON object handed to the order relay.
    pub fn to_payload(&self) -> Value {
        let mut obj = Map::new();
        let mut put = |key: &str, value: &str| {
            obj.insert(key.to_string(), Value::String(value.to_string()));
        };

        put("name", &self.name);
        if let Some(contact) = &self.contact_person {
            put("contactPerson", contact);
        }
        put("phone", &self.phone);
        put("email", &self.email);
        put("address", &self.address);
        if let Some(numbers) = &self.order_numbers {
            put("orderNumbers", numbers);
        }
        put("supermarket", &self.supermarket);
        put("orderType", &self.order_type);
        put("items", &self.items);
        put("total", &self.total);
        put("notes", &self.notes);
        Value::Object(obj)
    }
}

pub fn build_supermarket_order(cart: &Cart, form: &CheckoutForm) -> CheckoutResult<OrderRecord> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let form = form.validated()?;

    let items = cart
        .lines()
        .iter()
        .map(|line| format!("{} (x{})", line.name, line.qty))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(OrderRecord {
        name: form.name,
        phone: form.phone,
        email: form.email,
        address: form.address,
        order_numbers: Some(form.order_numbers),
        contact_person: None,
        supermarket: cart.store().to_string(),
        order_type: ORDER_TYPE_SUPERMARKET.to_string(),
        items,
        total: format_ghs(cart.total_minor()),
        notes: form.notes,
    })
}

pub fn build_pickup_order(form: &CheckoutForm) -> CheckoutResult<OrderRecord> {
    let form = form.validated()?;
    Ok(OrderRecord {
        name: form.name,
        phone: form.phone,
        email: form.email,
        address: form.address,
        order_numbers: Some(form.order_numbers),
        contact_person: None,
        supermarket: PICKUP_SUPERMARKET.to_string(),
        order_type: ORDER_TYPE_PICKUP.to_string(),
        items: PICKUP_ITEMS.to_string(),
        total: PICKUP_TOTAL.to_string(),
        notes: form.notes,
    })
}

/// Retailer details sent with a bulk list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkForm {
    pub business: String,
    pub contact: String,
    pub phone: String,
    pub email: String,
    pub location: String,
}

/// One line of a retailer's bulk list: `item,qty,notes`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkItem {
    pub item: String,
    /// Free text; retailers write things like `12` or `2 cartons`.
    pub qty: String,
    pub notes: String,
}

/// Parse a bulk list, one `item,qty,notes` line per entry.
///
/// Blank lines are skipped and every part is trimmed. Quantity and notes are
/// optional, and notes keep any further commas.
pub fn parse_bulk_items(text: &str) -> Vec<BulkItem> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let mut parts = line.split(',').map(str::trim);
            let item = parts.next().unwrap_or_default().to_string();
            let qty = parts.next().unwrap_or_default().to_string();
            let notes = parts.collect::<Vec<_>>().join(",");
            BulkItem { item, qty, notes }
        })
        .collect()
}

pub fn build_bulk_order(form: &BulkForm, items: &[BulkItem]) -> CheckoutResult<OrderRecord> {
    let business = required("business", &form.business)?;
    let contact = required("contact", &form.contact)?;
    let phone = required("phone", &form.phone)?;
    let location = required("location", &form.location)?;
    if items.is_empty() {
        return Err(CheckoutError::NoBulkItems);
    }

    let lines = items
        .iter()
        .map(|it| {
            let mut line = it.item.clone();
            if !it.qty.is_empty() {
                line.push_str(&format!(" (x{})", it.qty));
            }
            if !it.notes.is_empty() {
                line.push_str(&format!(" \u{2014} {}", it.notes));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("; ");

    Ok(OrderRecord {
        name: business,
        phone,
        email: form.email.trim().to_string(),
        address: location,
        order_numbers: None,
        contact_person: Some(contact),
        supermarket: BULK_SUPERMARKET.to_string(),
        order_type: ORDER_TYPE_BULK.to_string(),
        items: lines,
        total: BULK_TOTAL.to_string(),
        notes: format!("Bulk request uploaded via retailers page. {} lines", items.len()),
    })
}

/// Short prefilled WhatsApp message for a bulk list.
///
/// Nothing is required here; a missing business name reads as "Retailer".
pub fn bulk_whatsapp_text(form: &BulkForm, items: &[BulkItem]) -> String {
    let business = match form.business.trim() {
        "" => "Retailer",
        name => name,
    };
    let first = items
        .iter()
        .take(WHATSAPP_ITEM_LIMIT)
        .map(|it| {
            if it.qty.is_empty() {
                it.item.clone()
            } else {
                format!("{} x{}", it.item, it.qty)
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    let more = if items.len() > WHATSAPP_ITEM_LIMIT { " (and more)" } else { "" };

    format!(
        "Hello Mieza, I am {}. Bulk request: {}{}. Delivery: {}. Contact: {}",
        business,
        first,
        more,
        form.location.trim(),
        form.phone.trim()
    )
}

/// wa.me link that opens the Mieza chat with [`bulk_whatsapp_text`] filled in.
pub fn bulk_whatsapp_link(form: &BulkForm, items: &[BulkItem]) -> Result<Url, url::ParseError> {
    Url::parse_with_params(WHATSAPP_CHAT, &[("text", bulk_whatsapp_text(form, items))])
}

/// Fill a cart for `store` from `(product id, quantity)` pairs.
pub fn cart_from_items(
    catalog: &Catalog,
    store: &str,
    items: &[(String, u32)],
) -> CheckoutResult<Cart> {
    if !catalog.contains_store(store) {
        return Err(CheckoutError::UnknownStore(store.to_string()));
    }

    let mut cart = Cart::new(store);
    for (id, qty) in items {
        let product = catalog
            .find_product(store, id)
            .ok_or_else(|| CheckoutError::UnknownProduct(id.clone()))?;
        cart.add_qty(product, *qty);
    }
    Ok(cart)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::sample;

    fn form() -> CheckoutForm {
        CheckoutForm {
            name: "  Ama Mensah ".to_string(),
            phone: "0241234567".to_string(),
            address: "East Legon, Accra".to_string(),
            email: "ama@example.com".to_string(),
            order_numbers: " JM-1001 ".to_string(),
            notes: "Call on arrival".to_string(),
        }
    }

    fn cart() -> Cart {
        cart_from_items(
            &sample(),
            "shoprite",
            &[("shop-2".to_string(), 2), ("shop-1".to_string(), 1)],
        )
        .unwrap()
    }

    #[test]
    fn supermarket_order_record() {
        let order = build_supermarket_order(&cart(), &form()).unwrap();

        assert_eq!(order.name, "Ama Mensah");
        assert_eq!(order.order_numbers.as_deref(), Some("JM-1001"));
        assert_eq!(order.contact_person, None);
        assert_eq!(order.supermarket, "shoprite");
        assert_eq!(order.order_type, "Supermarket");
        assert_eq!(order.items, "Bread Loaf (x2), Fresh Milk (2L) (x1)");
        assert_eq!(order.total, "GHS 32.00");
        assert_eq!(order.notes, "Call on arrival");
    }

    #[test]
    fn empty_cart_rejected_first() {
        let empty = Cart::new("shoprite");
        assert_eq!(
            build_supermarket_order(&empty, &CheckoutForm::default()),
            Err(CheckoutError::EmptyCart)
        );
    }

    #[test]
    fn required_fields() {
        for (field, blank) in [
            ("name", CheckoutForm { name: " ".into(), ..form() }),
            ("phone", CheckoutForm { phone: String::new(), ..form() }),
            ("address", CheckoutForm { address: "\t".into(), ..form() }),
        ] {
            assert_eq!(
                build_supermarket_order(&cart(), &blank),
                Err(CheckoutError::MissingField(field))
            );
        }

        let minimal = CheckoutForm {
            email: String::new(),
            order_numbers: String::new(),
            notes: String::new(),
            ..form()
        };
        assert!(build_supermarket_order(&cart(), &minimal).is_ok());
    }

    #[test]
    fn pickup_order_record() {
        let order = build_pickup_order(&form()).unwrap();
        assert_eq!(order.supermarket, "Jumia");
        assert_eq!(order.order_type, "Jumia Delivery");
        assert_eq!(order.items, "Jumia Parcel Pickup");
        assert_eq!(order.total, "N/A");
        assert_eq!(order.order_numbers.as_deref(), Some("JM-1001"));

        assert_eq!(
            build_pickup_order(&CheckoutForm::default()),
            Err(CheckoutError::MissingField("name"))
        );
    }

    #[test]
    fn payload_uses_sheet_field_names() {
        let payload = build_pickup_order(&form()).unwrap().to_payload();
        let obj = payload.as_object().unwrap();

        for key in [
            "name",
            "phone",
            "email",
            "address",
            "orderNumbers",
            "supermarket",
            "orderType",
            "items",
            "total",
            "notes",
        ] {
            assert!(obj.contains_key(key), "missing {}", key);
        }
        assert_eq!(obj.len(), 10);
    }

    #[test]
    fn payload_matches_serde_form() {
        let order = build_supermarket_order(&cart(), &form()).unwrap();
        assert_eq!(order.to_payload(), serde_json::to_value(&order).unwrap());
    }

    fn bulk_form() -> BulkForm {
        BulkForm {
            business: " Kofi Provisions ".to_string(),
            contact: "Kofi Boateng".to_string(),
            phone: "0551234567".to_string(),
            email: String::new(),
            location: "Madina Market".to_string(),
        }
    }

    #[test]
    fn bulk_items_skip_blank_lines() {
        let items = parse_bulk_items("Rice 50kg,10\r\n\n   \nSugar, 4 ,\n");
        assert_eq!(
            items,
            vec![
                BulkItem { item: "Rice 50kg".into(), qty: "10".into(), notes: String::new() },
                BulkItem { item: "Sugar".into(), qty: "4".into(), notes: String::new() },
            ]
        );
        assert!(parse_bulk_items("  \n\n").is_empty());
    }

    #[test]
    fn bulk_item_without_qty() {
        let items = parse_bulk_items("Milo tins\nSardines,,in oil");
        assert_eq!(items[0], BulkItem { item: "Milo tins".into(), ..Default::default() });
        assert_eq!(items[1].qty, "");
        assert_eq!(items[1].notes, "in oil");
    }

    #[test]
    fn bulk_notes_keep_commas() {
        let items = parse_bulk_items("Oil,2 cartons, 5L, not 1L ,please");
        assert_eq!(items[0].qty, "2 cartons");
        assert_eq!(items[0].notes, "5L,not 1L,please");
    }

    #[test]
    fn bulk_order_record() {
        let items = parse_bulk_items("Rice,10,Jasmine\nSugar\nOil,2");
        let order = build_bulk_order(&bulk_form(), &items).unwrap();

        assert_eq!(order.name, "Kofi Provisions");
        assert_eq!(order.contact_person.as_deref(), Some("Kofi Boateng"));
        assert_eq!(order.address, "Madina Market");
        assert_eq!(order.order_numbers, None);
        assert_eq!(order.supermarket, "Bulk-Retail");
        assert_eq!(order.order_type, ORDER_TYPE_BULK);
        assert_eq!(order.items, "Rice (x10) \u{2014} Jasmine; Sugar; Oil (x2)");
        assert_eq!(order.total, "TBD");
        assert_eq!(order.notes, "Bulk request uploaded via retailers page. 3 lines");

        let payload = order.to_payload();
        let obj = payload.as_object().unwrap();
        assert_eq!(obj["contactPerson"], "Kofi Boateng");
        assert!(!obj.contains_key("orderNumbers"));
        assert_eq!(obj.len(), 10);
        assert_eq!(payload, serde_json::to_value(&order).unwrap());
    }

    #[test]
    fn bulk_order_requires_details_then_items() {
        assert_eq!(
            build_bulk_order(&BulkForm::default(), &[]),
            Err(CheckoutError::MissingField("business"))
        );
        for (field, blank) in [
            ("contact", BulkForm { contact: " ".into(), ..bulk_form() }),
            ("phone", BulkForm { phone: String::new(), ..bulk_form() }),
            ("location", BulkForm { location: "\t".into(), ..bulk_form() }),
        ] {
            assert_eq!(build_bulk_order(&blank, &[]), Err(CheckoutError::MissingField(field)));
        }
        assert_eq!(
            build_bulk_order(&bulk_form(), &parse_bulk_items("\n \n")),
            Err(CheckoutError::NoBulkItems)
        );
    }

    #[test]
    fn whatsapp_text_lists_first_eight() {
        let short = parse_bulk_items("Rice,10\nSugar");
        assert_eq!(
            bulk_whatsapp_text(&bulk_form(), &short),
            "Hello Mieza, I am Kofi Provisions. Bulk request: Rice x10, Sugar. \
             Delivery: Madina Market. Contact: 0551234567"
        );

        let many: String = (1..=9).map(|n| format!("Item {},{}\n", n, n)).collect();
        let text = bulk_whatsapp_text(&BulkForm::default(), &parse_bulk_items(&many));
        assert!(text.starts_with("Hello Mieza, I am Retailer. Bulk request: Item 1 x1, "));
        assert!(text.contains("Item 8 x8 (and more). Delivery: . Contact: "));
        assert!(!text.contains("Item 9"));
    }

    #[test]
    fn whatsapp_link_encodes_text() {
        let link = bulk_whatsapp_link(&bulk_form(), &parse_bulk_items("Rice & Beans,2")).unwrap();
        assert_eq!(link.host_str(), Some("wa.me"));
        assert_eq!(link.path(), "/233551836194");

        let (key, text) = link.query_pairs().next().unwrap();
        assert_eq!(key, "text");
        assert_eq!(text, bulk_whatsapp_text(&bulk_form(), &parse_bulk_items("Rice & Beans,2")));
        assert!(!link.as_str().contains(' '));
    }

    #[test]
    fn cart_from_unknown_ids() {
        let catalog = sample();
        assert_eq!(
            cart_from_items(&catalog, "melcom", &[]),
            Err(CheckoutError::UnknownStore("melcom".to_string()))
        );
        assert_eq!(
            cart_from_items(&catalog, "shoprite", &[("city-1".to_string(), 1)]),
            Err(CheckoutError::UnknownProduct("city-1".to_string()))
        );
    }
}
