//! CalDAV implementation of the remote store.
//!
//! Collection discovery follows the standard chain: current-user-principal,
//! then calendar-home-set, then a Depth:1 listing of the home. Servers that
//! skip a step fall back to the previous path.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};

use super::{CalendarStore, Collection};
use crate::error::{ClassdavError, ClassdavResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const PRINCIPAL_BODY: &str = r#"<propfind xmlns="DAV:">
    <prop>
        <current-user-principal/>
    </prop>
</propfind>"#;

const HOME_SET_BODY: &str = r#"<propfind xmlns="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
    <prop>
        <C:calendar-home-set/>
    </prop>
</propfind>"#;

const COLLECTIONS_BODY: &str = r#"<propfind xmlns="DAV:">
    <prop>
        <resourcetype/>
        <displayname/>
    </prop>
</propfind>"#;

const EVENTS_QUERY_BODY: &str = r#"<C:calendar-query xmlns="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
    <prop>
        <getetag/>
    </prop>
    <C:filter>
        <C:comp-filter name="VCALENDAR">
            <C:comp-filter name="VEVENT"/>
        </C:comp-filter>
    </C:filter>
</C:calendar-query>"#;

/// CalDAV client bound to one endpoint + credential pair.
pub struct CaldavStore {
    http: Client,
    base_url: Url,
    username: String,
    password: String,
}

impl CaldavStore {
    pub fn new(base_url: &str, username: &str, password: &str) -> ClassdavResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ClassdavError::Config(format!("invalid CalDAV URL '{}': {}", base_url, e)))?;
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(CaldavStore {
            http,
            base_url,
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    /// Turn a server href into an absolute URL against the endpoint.
    fn absolute(&self, href: &str) -> ClassdavResult<Url> {
        self.base_url
            .join(href)
            .map_err(|e| ClassdavError::Caldav(format!("bad href '{}': {}", href, e)))
    }

    async fn dav_request(
        &self,
        method: &str,
        url: Url,
        depth: &str,
        body: &str,
    ) -> ClassdavResult<String> {
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|e| ClassdavError::Caldav(e.to_string()))?;

        let response = self
            .http
            .request(method, url.clone())
            .basic_auth(&self.username, Some(&self.password))
            .header("Depth", depth)
            .header("Content-Type", "application/xml; charset=utf-8")
            .body(body.to_string())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassdavError::Caldav(format!(
                "{} returned {}",
                url, status
            )));
        }

        Ok(response.text().await?)
    }

    /// PROPFIND a single href-valued property, e.g. the principal path.
    async fn propfind_href(&self, url: Url, body: &str, element: &str) -> ClassdavResult<Option<String>> {
        let xml = self.dav_request("PROPFIND", url, "0", body).await?;
        Ok(find_nested_href(&xml, element))
    }
}

#[async_trait]
impl CalendarStore for CaldavStore {
    async fn resolve_collection(&self) -> ClassdavResult<Option<Collection>> {
        // Some servers expose collections directly under the endpoint path,
        // so each discovery step falls back to its input on absence.
        let principal = self
            .propfind_href(self.base_url.clone(), PRINCIPAL_BODY, "current-user-principal")
            .await?
            .unwrap_or_else(|| self.base_url.path().to_string());

        let home = self
            .propfind_href(self.absolute(&principal)?, HOME_SET_BODY, "calendar-home-set")
            .await?
            .unwrap_or(principal);

        let xml = self
            .dav_request("PROPFIND", self.absolute(&home)?, "1", COLLECTIONS_BODY)
            .await?;

        Ok(parse_collections(&xml)?.into_iter().next())
    }

    async fn list_resources(&self, collection: &Collection) -> ClassdavResult<Vec<String>> {
        let xml = self
            .dav_request("REPORT", self.absolute(&collection.href)?, "1", EVENTS_QUERY_BODY)
            .await?;

        let mut hrefs = parse_resource_hrefs(&xml)?;
        // The multistatus may include the collection itself.
        hrefs.retain(|h| h.trim_end_matches('/') != collection.href.trim_end_matches('/'));
        Ok(hrefs)
    }

    async fn delete_resource(&self, href: &str) -> ClassdavResult<()> {
        let url = self.absolute(href)?;
        let response = self
            .http
            .delete(url.clone())
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;

        let status = response.status();
        // 404 means the resource is already gone
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            return Err(ClassdavError::Caldav(format!(
                "DELETE {} returned {}",
                url, status
            )));
        }

        Ok(())
    }

    async fn put_resource(
        &self,
        collection: &Collection,
        name: &str,
        ics: &str,
    ) -> ClassdavResult<()> {
        let href = format!("{}{}", collection.href, name);
        let url = self.absolute(&href)?;

        // Unconditional overwrite: no If-Match/If-None-Match, last write wins.
        let response = self
            .http
            .put(url.clone())
            .basic_auth(&self.username, Some(&self.password))
            .header("Content-Type", "text/calendar; charset=utf-8")
            .body(ics.to_string())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassdavError::Caldav(format!(
                "PUT {} returned {}",
                url, status
            )));
        }

        Ok(())
    }
}

/// Find the href nested inside the first `element` of a multistatus body.
fn find_nested_href(xml: &str, element: &str) -> Option<String> {
    let doc = roxmltree::Document::parse(xml).ok()?;
    doc.root_element()
        .descendants()
        .find(|n| n.tag_name().name() == element)?
        .descendants()
        .find(|n| n.tag_name().name() == "href")?
        .text()
        .map(|s| s.trim().to_string())
}

/// Parse calendar collections from a Depth:1 PROPFIND multistatus response.
fn parse_collections(xml: &str) -> ClassdavResult<Vec<Collection>> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|e| ClassdavError::Caldav(format!("bad multistatus response: {}", e)))?;
    let root = doc.root_element();

    let mut collections = Vec::new();

    for response in root.descendants().filter(|n| n.tag_name().name() == "response") {
        let href = response
            .descendants()
            .find(|n| n.tag_name().name() == "href")
            .and_then(|n| n.text())
            .map(|s| s.trim().to_string());

        let Some(href) = href else { continue };

        // Only keep resources whose resourcetype marks them as a calendar
        let is_calendar = response
            .descendants()
            .filter(|n| n.tag_name().name() == "resourcetype")
            .any(|rt| rt.children().any(|c| c.tag_name().name() == "calendar"));

        if !is_calendar {
            continue;
        }

        let display_name = response
            .descendants()
            .find(|n| n.tag_name().name() == "displayname")
            .and_then(|n| n.text())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let href = if href.ends_with('/') {
            href
        } else {
            format!("{}/", href)
        };

        collections.push(Collection { href, display_name });
    }

    Ok(collections)
}

/// Parse event resource hrefs from a calendar-query REPORT response.
fn parse_resource_hrefs(xml: &str) -> ClassdavResult<Vec<String>> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|e| ClassdavError::Caldav(format!("bad multistatus response: {}", e)))?;
    let root = doc.root_element();

    let mut hrefs = Vec::new();

    for response in root.descendants().filter(|n| n.tag_name().name() == "response") {
        if let Some(href) = response
            .descendants()
            .find(|n| n.tag_name().name() == "href")
            .and_then(|n| n.text())
        {
            let href = href.trim();
            if !href.is_empty() {
                hrefs.push(href.to_string());
            }
        }
    }

    Ok(hrefs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_collections_from_multistatus() {
        let xml = r#"<?xml version="1.0"?>
<multistatus xmlns="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
    <response>
        <href>/dav/alice/</href>
        <propstat>
            <prop><resourcetype><collection/></resourcetype></prop>
            <status>HTTP/1.1 200 OK</status>
        </propstat>
    </response>
    <response>
        <href>/dav/alice/school</href>
        <propstat>
            <prop>
                <resourcetype><collection/><C:calendar/></resourcetype>
                <displayname>School</displayname>
            </prop>
            <status>HTTP/1.1 200 OK</status>
        </propstat>
    </response>
</multistatus>"#;

        let collections = parse_collections(xml).unwrap();
        assert_eq!(collections.len(), 1);
        assert_eq!(collections[0].href, "/dav/alice/school/");
        assert_eq!(collections[0].display_name.as_deref(), Some("School"));
    }

    #[test]
    fn parses_event_hrefs_from_report() {
        let xml = r#"<?xml version="1.0"?>
<multistatus xmlns="DAV:">
    <response>
        <href>/dav/alice/school/a.ics</href>
        <propstat><prop><getetag>"1"</getetag></prop></propstat>
    </response>
    <response>
        <href>/dav/alice/school/b.ics</href>
        <propstat><prop><getetag>"2"</getetag></prop></propstat>
    </response>
</multistatus>"#;

        let hrefs = parse_resource_hrefs(xml).unwrap();
        assert_eq!(hrefs, ["/dav/alice/school/a.ics", "/dav/alice/school/b.ics"]);
    }

    #[test]
    fn finds_nested_principal_href() {
        let xml = r#"<?xml version="1.0"?>
<multistatus xmlns="DAV:">
    <response>
        <href>/</href>
        <propstat>
            <prop>
                <current-user-principal><href>/principals/alice/</href></current-user-principal>
            </prop>
        </propstat>
    </response>
</multistatus>"#;

        assert_eq!(
            find_nested_href(xml, "current-user-principal").as_deref(),
            Some("/principals/alice/")
        );
        assert_eq!(find_nested_href(xml, "calendar-home-set"), None);
    }
}
