use std::collections::HashMap;

use crate::models::{contact_display_name, Company, Contact};

/// Id maps over one snapshot. Built per call and never cached.
pub struct Lookup<'a> {
    contacts: HashMap<&'a str, &'a Contact>,
    companies: HashMap<&'a str, &'a Company>,
}

impl<'a> Lookup<'a> {
    /// Later duplicates of an id win, matching a plain map rebuild.
    pub fn new(contacts: &'a [Contact], companies: &'a [Company]) -> Self {
        Self {
            contacts: contacts.iter().map(|c| (c.id.as_str(), c)).collect(),
            companies: companies.iter().map(|c| (c.id.as_str(), c)).collect(),
        }
    }

    pub fn contact(&self, id: &str) -> Option<&'a Contact> {
        self.contacts.get(id).copied()
    }

    pub fn company(&self, id: &str) -> Option<&'a Company> {
        self.companies.get(id).copied()
    }

    /// Name of the contact's company, or "" when unset or dangling.
    pub fn company_name_for(&self, contact: Option<&Contact>) -> String {
        contact
            .filter(|c| !c.company_id.is_empty())
            .and_then(|c| self.company(&c.company_id))
            .map(|co| co.name.clone())
            .unwrap_or_default()
    }

    pub fn contact_name(&self, id: &str, fallback: &str) -> String {
        contact_display_name(self.contact(id), fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> (Vec<Contact>, Vec<Company>) {
        let contacts = vec![
            Contact {
                id: "c1".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                company_id: "co1".to_string(),
                ..Default::default()
            },
            Contact {
                id: "c2".to_string(),
                company_id: "gone".to_string(),
                ..Default::default()
            },
        ];
        let companies = vec![Company {
            id: "co1".to_string(),
            name: "Analytical Engines".to_string(),
            ..Default::default()
        }];
        (contacts, companies)
    }

    #[test]
    fn test_company_name_resolution() {
        let (contacts, companies) = fixtures();
        let lookup = Lookup::new(&contacts, &companies);

        assert_eq!(lookup.company_name_for(lookup.contact("c1")), "Analytical Engines");
        assert_eq!(lookup.company_name_for(lookup.contact("c2")), "");
        assert_eq!(lookup.company_name_for(None), "");
    }

    #[test]
    fn test_dangling_contact_uses_fallback() {
        let (contacts, companies) = fixtures();
        let lookup = Lookup::new(&contacts, &companies);

        assert_eq!(lookup.contact_name("c1", "Unknown"), "Ada Lovelace");
        assert_eq!(lookup.contact_name("c2", "Unknown"), "Unknown");
        assert_eq!(lookup.contact_name("missing", "?"), "?");
        assert_eq!(lookup.contact_name("", "?"), "?");
    }
}
